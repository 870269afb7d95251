//! allocator.rs
//!
//! Подбор лучшей группы мест для компании зрителей.
//!
//! Кандидаты собираются из непрерывных отрезков свободных мест подходящего типа,
//! из каждого отрезка берётся один центрированный кусок нужной длины.
//! Кандидат отбрасывается, если после брони в ряду останется одиночное
//! свободное место. Лучший кандидат: ближе к среднему ряду, затем ближе
//! к центру зала по колонкам. Если для заданного типа мест ничего не нашлось,
//! поиск повторяется с фильтром `any`.

use tracing::debug;

use crate::models::{LayoutConfig, Seat, SeatGrid, SeatGroup, SeatPosition, SeatTypeFilter};
use crate::services::gaps::would_create_single_gap;

/// Возвращает ровно `group_size` мест или пустую группу, если вариантов нет.
pub fn find_best_group(
    grid: &SeatGrid,
    layout: &LayoutConfig,
    group_size: usize,
    filter: SeatTypeFilter,
) -> SeatGroup {
    if group_size == 0 {
        return SeatGroup::empty();
    }

    if let Some(group) = search(grid, layout, group_size, filter) {
        return group;
    }

    if !filter.is_any() {
        debug!(group_size, %filter, "no matching seats for group, falling back to any");
        if let Some(group) = search(grid, layout, group_size, SeatTypeFilter::Any) {
            return group;
        }
    }

    debug!(group_size, "no seats found for group");
    SeatGroup::empty()
}

struct Candidate {
    row: usize,
    cols: Vec<usize>,
    row_distance: usize,
    col_distance: f64,
}

impl Candidate {
    fn new(layout: &LayoutConfig, row: usize, cols: Vec<usize>) -> Self {
        let mean = cols.iter().sum::<usize>() as f64 / cols.len() as f64;
        Self {
            row,
            row_distance: row.abs_diff(layout.middle_row()),
            col_distance: (mean - layout.center_column()).abs(),
            cols,
        }
    }

    // При равенстве выигрывает найденный раньше
    fn ranks_before(&self, other: &Candidate) -> bool {
        (self.row_distance, self.col_distance) < (other.row_distance, other.col_distance)
    }
}

fn search(
    grid: &SeatGrid,
    layout: &LayoutConfig,
    group_size: usize,
    filter: SeatTypeFilter,
) -> Option<SeatGroup> {
    let mut best: Option<Candidate> = None;

    for row in row_priority(grid.row_count(), layout.middle_row()) {
        if !row_can_match(layout, row, filter) {
            continue;
        }
        let Some(seats) = grid.row(row) else {
            continue;
        };

        for run in runs_in_row(seats, layout, group_size, filter) {
            let cols = centered_slice(&run, group_size);

            // Проход внутри отрезка проверяем место за местом
            if !layout.is_contiguous(&cols) {
                continue;
            }

            let positions: Vec<SeatPosition> =
                cols.iter().map(|&col| SeatPosition::new(row, col)).collect();
            if let Some(stranded) = would_create_single_gap(grid, layout, row, &positions) {
                debug!(row, ?cols, stranded, "candidate would strand a single seat");
                continue;
            }

            let candidate = Candidate::new(layout, row, cols);
            if best.as_ref().map_or(true, |b| candidate.ranks_before(b)) {
                best = Some(candidate);
            }
        }
    }

    let best = best?;
    let seats = grid.row(best.row)?;
    let group = best
        .cols
        .iter()
        .map(|&col| seats.get(col).cloned())
        .collect::<Option<Vec<Seat>>>()?;
    Some(SeatGroup::from_seats(group))
}

// Ряды по удалённости от среднего, при равенстве в естественном порядке
fn row_priority(rows: usize, middle_row: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows).collect();
    order.sort_by_key(|&row| row.abs_diff(middle_row));
    order
}

fn row_can_match(layout: &LayoutConfig, row: usize, filter: SeatTypeFilter) -> bool {
    match filter {
        SeatTypeFilter::Vip => layout.is_vip_row(row) && layout.has_vip_columns(),
        SeatTypeFilter::Accessible => layout.row_has_accessible(row),
        SeatTypeFilter::Any | SeatTypeFilter::Normal => true,
    }
}

/// Максимальные отрезки свободных мест нужного типа длиной не меньше `group_size`.
///
/// Ряд режется на проходе. Отрезки по обе стороны прохода склеиваются,
/// только если группа не помещается ни в один из них по отдельности.
fn runs_in_row(
    seats: &[Seat],
    layout: &LayoutConfig,
    group_size: usize,
    filter: SeatTypeFilter,
) -> Vec<Vec<usize>> {
    let aisle = layout.aisle_after_column();
    let mut runs: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    // Колонка места - его индекс в ряду
    for (col, seat) in seats.iter().enumerate() {
        if col == aisle + 1 && !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
        if seat.is_available() && filter.matches(seat.seat_type) {
            current.push(col);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    join_across_aisle(&mut runs, aisle, group_size);
    runs.retain(|run| run.len() >= group_size);
    runs
}

fn join_across_aisle(runs: &mut Vec<Vec<usize>>, aisle: usize, group_size: usize) {
    let left = runs.iter().position(|run| run.last() == Some(&aisle));
    let right = runs.iter().position(|run| run.first() == Some(&(aisle + 1)));

    let (Some(left), Some(right)) = (left, right) else {
        return;
    };
    if runs[left].len() >= group_size || runs[right].len() >= group_size {
        return;
    }

    // left и right соседние в списке, left идёт первым
    let tail = runs.remove(right);
    runs[left].extend(tail);
}

fn centered_slice(run: &[usize], group_size: usize) -> Vec<usize> {
    let start = (run.len() - group_size) / 2;
    run[start..start + group_size].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PricingTable, SeatStatus, SeatType};

    fn hall() -> (SeatGrid, LayoutConfig) {
        let layout = LayoutConfig::cinema_default();
        (SeatGrid::generate(&layout, &PricingTable::default()), layout)
    }

    fn cols(group: &SeatGroup) -> Vec<usize> {
        group.seats().iter().map(|s| s.col).collect()
    }

    #[test]
    fn rows_are_visited_from_the_middle_out() {
        assert_eq!(row_priority(5, 2), vec![2, 1, 3, 0, 4]);
        assert_eq!(row_priority(4, 2), vec![2, 1, 3, 0]);
    }

    #[test]
    fn centered_slice_takes_the_middle_of_the_run() {
        assert_eq!(centered_slice(&[0, 1, 2, 3, 4, 5], 2), vec![2, 3]);
        assert_eq!(centered_slice(&[0, 1, 2, 3, 4, 5], 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(centered_slice(&[7, 8, 9], 3), vec![7, 8, 9]);
    }

    #[test]
    fn runs_split_at_the_aisle() {
        let (grid, layout) = hall();
        let runs = runs_in_row(grid.row(7).unwrap(), &layout, 2, SeatTypeFilter::Any);
        assert_eq!(runs, vec![(0..6).collect::<Vec<_>>(), (6..12).collect()]);
    }

    #[test]
    fn runs_join_across_the_aisle_when_neither_side_fits() {
        let (grid, layout) = hall();
        let runs = runs_in_row(grid.row(7).unwrap(), &layout, 7, SeatTypeFilter::Any);
        assert_eq!(runs, vec![(0..12).collect::<Vec<_>>()]);
    }

    #[test]
    fn small_group_lands_in_the_middle_row() {
        let (grid, layout) = hall();
        let group = find_best_group(&grid, &layout, 2, SeatTypeFilter::Any);
        assert_eq!(group.row(), Some(7));
        assert_eq!(cols(&group), vec![2, 3]);
        assert_eq!(group.labels(), vec!["H3", "H4"]);
    }

    #[test]
    fn large_group_spans_the_aisle() {
        let (grid, layout) = hall();
        let group = find_best_group(&grid, &layout, 7, SeatTypeFilter::Any);
        assert_eq!(group.row(), Some(7));
        assert_eq!(cols(&group), (2..=8).collect::<Vec<_>>());
    }

    #[test]
    fn runs_use_the_seat_index_in_the_row() {
        let layout = LayoutConfig::builder(1, 3, 2).build().unwrap();
        let mut seats = SeatGrid::generate(&layout, &PricingTable::default()).into_rows().remove(0);
        seats[0].status = SeatStatus::Booked;
        seats[1].col = 7;
        seats[2].col = 8;
        assert_eq!(runs_in_row(&seats, &layout, 2, SeatTypeFilter::Any), vec![vec![1, 2]]);
    }

    #[test]
    fn middle_row_beats_a_better_centered_neighbour() {
        let (mut grid, layout) = hall();
        // в ряду 7 свободна только пара у стены, ряд 6 пустой
        for col in 2..12 {
            grid.set_status(SeatPosition::new(7, col), SeatStatus::Booked);
        }
        let group = find_best_group(&grid, &layout, 2, SeatTypeFilter::Any);
        assert_eq!(group.row(), Some(7));
        assert_eq!(cols(&group), vec![0, 1]);
    }

    #[test]
    fn zero_or_oversized_groups_get_nothing() {
        let (grid, layout) = hall();
        assert!(find_best_group(&grid, &layout, 0, SeatTypeFilter::Any).is_empty());
        assert!(find_best_group(&grid, &layout, 13, SeatTypeFilter::Any).is_empty());
    }

    #[test]
    fn vip_request_stays_in_vip_rows() {
        let (grid, layout) = hall();
        let group = find_best_group(&grid, &layout, 4, SeatTypeFilter::Vip);
        assert_eq!(group.len(), 4);
        assert_eq!(group.row(), Some(9));
        assert!(group.seats().iter().all(|s| s.seat_type == SeatType::Vip));
        assert_eq!(group.total_price(), 60.0);
    }

    #[test]
    fn accessible_request_uses_accessible_pairs() {
        let (grid, layout) = hall();
        let group = find_best_group(&grid, &layout, 2, SeatTypeFilter::Accessible);
        assert_eq!(group.row(), Some(5));
        assert_eq!(cols(&group), vec![0, 1]);
    }

    #[test]
    fn unsatisfiable_type_falls_back_to_any() {
        let (grid, layout) = hall();
        let accessible = find_best_group(&grid, &layout, 3, SeatTypeFilter::Accessible);
        let any = find_best_group(&grid, &layout, 3, SeatTypeFilter::Any);
        assert_eq!(accessible, any);
        assert_eq!(any.len(), 3);
    }

    #[test]
    fn candidate_that_strands_a_seat_is_skipped() {
        let (mut grid, layout) = hall();
        for row in 0..15 {
            for col in 0..12 {
                grid.set_status(SeatPosition::new(row, col), SeatStatus::Booked);
            }
        }
        // в ряду 2 свободны [0, 1, 2] и [9, 10], остальное выключено
        for col in 3..12 {
            grid.set_status(SeatPosition::new(2, col), SeatStatus::Disabled);
        }
        for col in [0, 1, 2, 9, 10] {
            grid.set_status(SeatPosition::new(2, col), SeatStatus::Available);
        }

        // [0, 1] зажал бы колонку 2, остаётся [9, 10]
        let group = find_best_group(&grid, &layout, 2, SeatTypeFilter::Any);
        assert_eq!(group.row(), Some(2));
        assert_eq!(cols(&group), vec![9, 10]);

        // одиночное место в любом из отрезков оставляет зажатого соседа
        assert!(find_best_group(&grid, &layout, 1, SeatTypeFilter::Any).is_empty());
    }
}
