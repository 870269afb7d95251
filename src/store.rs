//! store.rs
//!
//! Хранилище схемы зала: единственный владелец статусов мест.
//!
//! * Состояние лежит в памяти под `tokio::sync::RwLock` и (опционально) в JSON-файле.
//! * Каждое изменение увеличивает `version`. Изменяющие вызовы принимают версию,
//!   которую видел клиент, и отказывают с `VersionConflict`, если она устарела.
//! * Изменение применяется к копии, сначала сохраняется на диск, потом
//!   подменяет состояние в памяти: при ошибке записи память не меняется.
//! * Подбор и проверка мест работают на снимке под read-lock и друг другу не мешают.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::models::{
    GridError, LayoutConfig, PricingTable, Seat, SeatGrid, SeatGroup, SeatPosition, SeatSelection,
    SeatStatus, SeatTypeFilter,
};
use crate::services::{find_best_group, validate, SelectionError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access seat map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode seat map: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored seat map does not match its layout: {0}")]
    Grid(#[from] GridError),

    #[error("selection rejected: {0}")]
    Rejected(#[from] SelectionError),

    #[error("seat map changed: expected version {expected}, current is {current}")]
    VersionConflict { expected: u64, current: u64 },

    #[error("no seat at row {row}, column {col}")]
    UnknownSeat { row: usize, col: usize },
}

// Формат файла на диске
#[derive(Debug, Serialize, Deserialize)]
struct SeatMapDocument {
    #[serde(default)]
    version: u64,
    config: LayoutConfig,
    pricing: PricingTable,
    seats: Vec<Vec<Seat>>,
}

/// Согласованный снимок состояния зала.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub version: u64,
    pub layout: LayoutConfig,
    pub pricing: PricingTable,
    pub grid: SeatGrid,
}

impl Snapshot {
    fn generate(layout: LayoutConfig, pricing: PricingTable) -> Self {
        let grid = SeatGrid::generate(&layout, &pricing);
        Self { version: 0, layout, pricing, grid }
    }

    fn from_document(doc: SeatMapDocument) -> Result<Self, StoreError> {
        let grid = SeatGrid::from_rows(&doc.config, doc.seats)?;
        Ok(Self {
            version: doc.version,
            layout: doc.config,
            pricing: doc.pricing,
            grid,
        })
    }

    fn to_document(&self) -> SeatMapDocument {
        SeatMapDocument {
            version: self.version,
            config: self.layout.clone(),
            pricing: self.pricing.clone(),
            seats: self.grid.clone().into_rows(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatStats {
    pub total_seats: usize,
    pub available_seats: usize,
    pub booked_seats: usize,
    pub disabled_seats: usize,
    // процент проданных, один знак после запятой
    pub occupancy_rate: f64,
}

impl SeatStats {
    pub fn from_grid(grid: &SeatGrid) -> Self {
        let mut stats = SeatStats {
            total_seats: 0,
            available_seats: 0,
            booked_seats: 0,
            disabled_seats: 0,
            occupancy_rate: 0.0,
        };
        for seat in grid.seats() {
            stats.total_seats += 1;
            match seat.status {
                SeatStatus::Available => stats.available_seats += 1,
                SeatStatus::Booked => stats.booked_seats += 1,
                SeatStatus::Disabled => stats.disabled_seats += 1,
            }
        }
        if stats.total_seats > 0 {
            let rate = stats.booked_seats as f64 / stats.total_seats as f64 * 100.0;
            stats.occupancy_rate = (rate * 10.0).round() / 10.0;
        }
        stats
    }
}

/// Изменение статуса одного места (админка).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatUpdate {
    pub row: usize,
    pub col: usize,
    pub status: SeatStatus,
}

/// Результат успешного бронирования.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub version: u64,
    pub seats: Vec<Seat>,
    pub total_price: f64,
}

pub struct SeatStore {
    path: Option<PathBuf>,
    autosave: bool,
    state: RwLock<Snapshot>,
}

impl SeatStore {
    /// Хранилище без файла: для тестов и одноразовых расчётов.
    pub fn in_memory(layout: LayoutConfig, pricing: PricingTable) -> Self {
        Self {
            path: None,
            autosave: false,
            state: RwLock::new(Snapshot::generate(layout, pricing)),
        }
    }

    /// Открывает файл схемы. Если файла нет или он повреждён, генерирует
    /// свободный зал по `layout` и сразу сохраняет его.
    pub async fn open(
        path: impl Into<PathBuf>,
        autosave: bool,
        layout: LayoutConfig,
        pricing: PricingTable,
    ) -> Result<Self, StoreError> {
        let path = path.into();

        let snapshot = match read_document(&path).await {
            Ok(Some(snapshot)) => {
                info!("Seat map loaded from {} (version {})", path.display(), snapshot.version);
                snapshot
            }
            Ok(None) => {
                info!("No seat map at {}, generating default hall", path.display());
                let snapshot = Snapshot::generate(layout, pricing);
                write_document(&path, &snapshot).await?;
                snapshot
            }
            Err(StoreError::Json(e)) => {
                warn!("Seat map at {} is unreadable ({}), regenerating", path.display(), e);
                let snapshot = Snapshot::generate(layout, pricing);
                write_document(&path, &snapshot).await?;
                snapshot
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path: Some(path),
            autosave,
            state: RwLock::new(snapshot),
        })
    }

    /// Перечитывает состояние из файла, отбрасывая то, что в памяти.
    pub async fn load(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut state = self.state.write().await;
        match read_document(path).await? {
            Some(snapshot) => {
                debug!("Reloaded seat map version {}", snapshot.version);
                *state = snapshot;
            }
            None => warn!("Seat map file {} disappeared, keeping state in memory", path.display()),
        }
        Ok(())
    }

    pub async fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        // write-lock: записи в файл не должны пересекаться
        let state = self.state.write().await;
        write_document(path, &state).await
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    pub async fn version(&self) -> u64 {
        self.state.read().await.version
    }

    pub async fn stats(&self) -> SeatStats {
        SeatStats::from_grid(&self.state.read().await.grid)
    }

    /// Лучшие места для группы и версия схемы, на которой они подобраны.
    pub async fn recommend(&self, group_size: usize, filter: SeatTypeFilter) -> (u64, SeatGroup) {
        let state = self.state.read().await;
        let group = find_best_group(&state.grid, &state.layout, group_size, filter);
        (state.version, group)
    }

    /// Бронирует выбранные места, если схема не менялась с `expected_version`
    /// и выбор проходит проверку.
    pub async fn book(
        &self,
        expected_version: u64,
        selection: &[SeatSelection],
    ) -> Result<BookingReceipt, StoreError> {
        self.mutate(Some(expected_version), |snapshot| {
            let positions = validate(&snapshot.grid, &snapshot.layout, selection)?;
            let mut seats = Vec::with_capacity(positions.len());
            for pos in positions {
                snapshot.grid.set_status(pos, SeatStatus::Booked);
                if let Some(seat) = snapshot.grid.seat(pos) {
                    seats.push(seat.clone());
                }
            }
            let total_price: f64 = seats.iter().map(|s| s.price).sum();
            Ok((seats, total_price))
        })
        .await
        .map(|(version, (seats, total_price))| {
            info!("Booked {} seats, seat map version {}", seats.len(), version);
            BookingReceipt { version, seats, total_price }
        })
    }

    /// Ручная смена статусов. Либо применяются все изменения, либо ни одно.
    pub async fn update_statuses(
        &self,
        expected_version: u64,
        updates: &[SeatUpdate],
    ) -> Result<u64, StoreError> {
        let (version, ()) = self
            .mutate(Some(expected_version), |snapshot| {
                for update in updates {
                    let pos = SeatPosition::new(update.row, update.col);
                    if snapshot.grid.set_status(pos, update.status).is_none() {
                        return Err(StoreError::UnknownSeat { row: update.row, col: update.col });
                    }
                }
                Ok(())
            })
            .await?;
        info!("Updated {} seat statuses, seat map version {}", updates.len(), version);
        Ok(version)
    }

    /// Освобождает все забронированные места. Выключенные места остаются выключенными.
    pub async fn reset(&self) -> Result<u64, StoreError> {
        let (version, released) = self
            .mutate(None, |snapshot| {
                let booked: Vec<SeatPosition> = snapshot
                    .grid
                    .seats()
                    .filter(|s| s.status == SeatStatus::Booked)
                    .map(Seat::position)
                    .collect();
                for pos in &booked {
                    snapshot.grid.set_status(*pos, SeatStatus::Available);
                }
                Ok(booked.len())
            })
            .await?;
        warn!("RESET: released {} seats, seat map version {}", released, version);
        Ok(version)
    }

    // Цикл чтение-изменение-запись под write-lock
    async fn mutate<T, F>(&self, expected_version: Option<u64>, apply: F) -> Result<(u64, T), StoreError>
    where
        F: FnOnce(&mut Snapshot) -> Result<T, StoreError>,
    {
        let mut state = self.state.write().await;

        if let Some(expected) = expected_version {
            if expected != state.version {
                return Err(StoreError::VersionConflict {
                    expected,
                    current: state.version,
                });
            }
        }

        let mut next = state.clone();
        let output = apply(&mut next)?;
        next.version += 1;

        if self.autosave {
            if let Some(path) = &self.path {
                write_document(path, &next).await?;
            }
        }

        *state = next;
        Ok((state.version, output))
    }
}

async fn read_document(path: &Path) -> Result<Option<Snapshot>, StoreError> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let doc: SeatMapDocument = serde_json::from_str(&data)?;
    Snapshot::from_document(doc).map(Some)
}

// Пишем во временный файл и переименовываем, чтобы не оставить обрезанный JSON
async fn write_document(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let data = serde_json::to_vec_pretty(&snapshot.to_document())?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, data).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

    debug!("Seat map version {} written to {}", snapshot.version, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SeatStore {
        SeatStore::in_memory(LayoutConfig::cinema_default(), PricingTable::default())
    }

    #[tokio::test]
    async fn booking_bumps_version_and_marks_seats() {
        let store = store();
        let (version, group) = store.recommend(2, SeatTypeFilter::Any).await;
        assert_eq!(version, 0);

        let selection: Vec<SeatSelection> =
            group.positions().into_iter().map(SeatSelection::from).collect();
        let receipt = store.book(version, &selection).await.unwrap();

        assert_eq!(receipt.version, 1);
        assert_eq!(receipt.seats.len(), 2);
        assert_eq!(receipt.total_price, 20.0);
        assert!(receipt.seats.iter().all(|s| s.status == SeatStatus::Booked));

        let snapshot = store.snapshot().await;
        for pos in group.positions() {
            assert_eq!(snapshot.grid.seat(pos).unwrap().status, SeatStatus::Booked);
        }
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let store = store();
        store.book(0, &[SeatSelection::at(0, 0)]).await.unwrap();

        let err = store.book(0, &[SeatSelection::at(0, 5)]).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { expected: 0, current: 1 }));
    }

    #[tokio::test]
    async fn rejected_selection_leaves_state_untouched() {
        let store = store();
        let err = store
            .book(0, &[SeatSelection::at(3, 1), SeatSelection::at(3, 3)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(SelectionError::NotAdjacent)));
        assert_eq!(store.version().await, 0);
        assert_eq!(store.stats().await.booked_seats, 0);
    }

    #[tokio::test]
    async fn status_updates_are_all_or_nothing() {
        let store = store();
        let updates = [
            SeatUpdate { row: 1, col: 1, status: SeatStatus::Disabled },
            SeatUpdate { row: 1, col: 99, status: SeatStatus::Disabled },
        ];
        let err = store.update_statuses(0, &updates).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownSeat { row: 1, col: 99 }));
        assert_eq!(store.stats().await.disabled_seats, 0);

        let version = store.update_statuses(0, &updates[..1]).await.unwrap();
        assert_eq!(version, 1);
        assert_eq!(store.stats().await.disabled_seats, 1);
    }

    #[tokio::test]
    async fn reset_releases_booked_but_keeps_disabled() {
        let store = store();
        store
            .update_statuses(0, &[SeatUpdate { row: 0, col: 0, status: SeatStatus::Disabled }])
            .await
            .unwrap();
        store.book(1, &[SeatSelection::at(4, 4), SeatSelection::at(4, 5)]).await.unwrap();

        let version = store.reset().await.unwrap();
        assert_eq!(version, 3);

        let stats = store.stats().await;
        assert_eq!(stats.booked_seats, 0);
        assert_eq!(stats.disabled_seats, 1);
        assert_eq!(stats.available_seats, 179);
    }

    #[test]
    fn stats_round_occupancy_to_one_decimal() {
        let layout = LayoutConfig::cinema_default();
        let mut grid = SeatGrid::generate(&layout, &PricingTable::default());
        for col in 0..7 {
            grid.set_status(SeatPosition::new(0, col), SeatStatus::Booked);
        }
        grid.set_status(SeatPosition::new(1, 0), SeatStatus::Disabled);

        let stats = SeatStats::from_grid(&grid);
        assert_eq!(stats.total_seats, 180);
        assert_eq!(stats.booked_seats, 7);
        assert_eq!(stats.disabled_seats, 1);
        assert_eq!(stats.available_seats, 172);
        // 7 / 180 = 3.888...%
        assert_eq!(stats.occupancy_rate, 3.9);
    }
}
