//! Projection of schedule entries onto a time-slot × weekday grid.
//!
//! Rows follow the slot catalog's ordinal order and columns run Monday to
//! Sunday. An entry lands in the row whose slot starts exactly when the entry
//! starts; entries with no such slot stay off the grid and are listed in
//! [`ScheduleGrid::unplaced`].
//!
//! Two candidates resolving to the same cell conflict only when they share at
//! least one week. On a conflict the builder either rejects the build
//! ([`ConflictPolicy::Reject`], the default) or lets the later entry win
//! ([`ConflictPolicy::LastWriteWins`]).
//!
//! In the semester view a cell may be claimed by several entries meeting in
//! disjoint weeks (odd/even alternation, first/second half). The cell shows
//! the first of them in collection order; the others are listed in
//! [`ScheduleGrid::alternates`]. A week view never has alternates.

use crate::entry::ScheduleEntry;
use crate::time_slot::TimeSlotCatalog;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridView {
    /// Only entries meeting in the given semester week.
    Week(u32),
    /// Every entry, regardless of its weeks.
    Semester,
}

impl GridView {
    pub fn includes(&self, entry: &ScheduleEntry) -> bool {
        match self {
            GridView::Week(week) => entry.meets_in_week(*week),
            GridView::Semester => true,
        }
    }
}

impl fmt::Display for GridView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridView::Week(week) => write!(f, "week {week}"),
            GridView::Semester => f.write_str("whole semester"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    #[default]
    Reject,
    LastWriteWins,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "schedule entries {} and {} both occupy slot {}, day {}",
    .existing.id,
    .incoming.id,
    .row + 1,
    .column + 1
)]
pub struct GridConflict<'a> {
    /// Zero-based slot row.
    pub row: usize,
    /// Zero-based day column.
    pub column: usize,
    pub existing: &'a ScheduleEntry,
    pub incoming: &'a ScheduleEntry,
}

pub type GridRow<'a> = [Option<&'a ScheduleEntry>; DAYS_PER_WEEK];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGrid<'a> {
    view: GridView,
    rows: Vec<GridRow<'a>>,
    alternates: Vec<(usize, usize, &'a ScheduleEntry)>,
    unplaced: Vec<&'a ScheduleEntry>,
}

impl<'a> ScheduleGrid<'a> {
    fn empty(view: GridView, row_count: usize) -> Self {
        Self {
            view,
            rows: vec![[None; DAYS_PER_WEEK]; row_count],
            alternates: Vec::new(),
            unplaced: Vec::new(),
        }
    }

    pub fn view(&self) -> GridView {
        self.view
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        DAYS_PER_WEEK
    }

    pub fn rows(&self) -> &[GridRow<'a>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&'a ScheduleEntry> {
        self.rows.get(row).and_then(|r| r.get(column).copied().flatten())
    }

    /// Occupied cells as `(row, column, entry)`, row-major.
    pub fn placed(&self) -> impl Iterator<Item = (usize, usize, &'a ScheduleEntry)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(column, cell)| cell.map(|entry| (row, column, entry)))
        })
    }

    pub fn placed_count(&self) -> usize {
        self.placed().count()
    }

    /// Entries sharing a cell with the shown entry in disjoint weeks, as
    /// `(row, column, entry)` in collection order.
    pub fn alternates(&self) -> &[(usize, usize, &'a ScheduleEntry)] {
        &self.alternates
    }

    /// Every entry claiming the cell: the shown one first, then alternates.
    pub fn claimants(
        &self,
        row: usize,
        column: usize,
    ) -> impl Iterator<Item = &'a ScheduleEntry> + '_ {
        self.cell(row, column).into_iter().chain(
            self.alternates
                .iter()
                .filter(move |(r, c, _)| (*r, *c) == (row, column))
                .map(|(_, _, entry)| *entry),
        )
    }

    /// Candidates whose start time matched no slot.
    pub fn unplaced(&self) -> &[&'a ScheduleEntry] {
        &self.unplaced
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GridBuilder<'c> {
    slots: &'c TimeSlotCatalog,
    policy: ConflictPolicy,
}

impl<'c> GridBuilder<'c> {
    pub fn new(slots: &'c TimeSlotCatalog) -> Self {
        Self {
            slots,
            policy: ConflictPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    fn locate(&self, entry: &ScheduleEntry) -> Option<(usize, usize)> {
        let row = self.slots.row_of_start(entry.start)?;
        let column = usize::from(entry.day_of_week).checked_sub(1)?;
        (column < DAYS_PER_WEEK).then_some((row, column))
    }

    pub fn build<'a>(
        &self,
        entries: &'a [ScheduleEntry],
        view: GridView,
    ) -> Result<ScheduleGrid<'a>, GridConflict<'a>> {
        let mut grid = ScheduleGrid::empty(view, self.slots.len());
        for entry in entries.iter().filter(|e| view.includes(e)) {
            let Some((row, column)) = self.locate(entry) else {
                debug!(id = %entry.id, start = %entry.start, "entry matches no time slot");
                grid.unplaced.push(entry);
                continue;
            };
            let clash = grid
                .claimants(row, column)
                .find(|other| !other.weeks.is_disjoint(&entry.weeks));
            match (grid.rows[row][column], clash) {
                (None, _) => grid.rows[row][column] = Some(entry),
                (Some(_), None) => grid.alternates.push((row, column, entry)),
                (Some(shown), Some(existing)) => {
                    if self.policy == ConflictPolicy::Reject {
                        return Err(GridConflict {
                            row,
                            column,
                            existing,
                            incoming: entry,
                        });
                    }
                    debug!(
                        replaced = %existing.id,
                        by = %entry.id,
                        row,
                        column,
                        "grid cell overwritten"
                    );
                    grid.rows[row][column] = Some(entry);
                    grid.alternates.retain(|(r, c, other)| {
                        (*r, *c) != (row, column) || other.weeks.is_disjoint(&entry.weeks)
                    });
                    if shown.weeks.is_disjoint(&entry.weeks) {
                        grid.alternates.push((row, column, shown));
                    }
                }
            }
        }
        Ok(grid)
    }

    /// Every collision in `view`, each reported against the earliest entry
    /// in the same cell that shares a week with it.
    pub fn conflicts<'a>(
        &self,
        entries: &'a [ScheduleEntry],
        view: GridView,
    ) -> Vec<GridConflict<'a>> {
        let mut claimed: Vec<(usize, usize, &'a ScheduleEntry)> = Vec::new();
        let mut conflicts = Vec::new();
        for entry in entries.iter().filter(|e| view.includes(e)) {
            let Some((row, column)) = self.locate(entry) else {
                continue;
            };
            let clash = claimed.iter().find(|(r, c, other)| {
                (*r, *c) == (row, column) && !other.weeks.is_disjoint(&entry.weeks)
            });
            if let Some(&(_, _, existing)) = clash {
                conflicts.push(GridConflict {
                    row,
                    column,
                    existing,
                    incoming: entry,
                });
            }
            claimed.push((row, column, entry));
        }
        conflicts
    }

    /// One grid per week `1..=weeks`, built in parallel and returned in week
    /// order.
    pub fn build_all_weeks<'a>(
        &self,
        entries: &'a [ScheduleEntry],
        weeks: u32,
    ) -> Vec<Result<ScheduleGrid<'a>, GridConflict<'a>>> {
        (1..=weeks)
            .into_par_iter()
            .map(|week| self.build(entries, GridView::Week(week)))
            .collect()
    }
}

/// Builds a grid with the default (rejecting) conflict policy.
pub fn build_grid<'a>(
    entries: &'a [ScheduleEntry],
    slots: &TimeSlotCatalog,
    view: GridView,
) -> Result<ScheduleGrid<'a>, GridConflict<'a>> {
    GridBuilder::new(slots).build(entries, view)
}
