use cursive::{
    Cursive,
    view::{Nameable, Resizable},
    views::{NamedView, ResizedView},
};
use cursive_table_view::{TableView, TableViewItem};
use std::cmp::Ordering;

use crate::intercept::HeldRow;

pub(super) const HELD_TABLE: &str = "held-table";

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub(super) enum HeldColumn {
    Position,
    Mark,
    ID,
    Method,
    URI,
    Status,
}

/// A held exchange plus its place in the queue; position 0 is the one on display.
#[derive(Clone, Debug)]
pub(super) struct HeldTableItem {
    position: usize,
    row: HeldRow,
}

impl TableViewItem<HeldColumn> for HeldTableItem {
    fn to_column(&self, column: HeldColumn) -> String {
        match column {
            HeldColumn::Position => self.position.to_string(),
            HeldColumn::Mark => if self.row.current { ">".to_string() } else { "".to_string() },
            HeldColumn::ID => self.row.id.to_string(),
            HeldColumn::Method => self.row.method.clone(),
            HeldColumn::URI => self.row.uri.clone(),
            HeldColumn::Status => match self.row.status_code {
                Some(code) => code.to_string(),
                None => "...".to_string()
            },
        }
    }

    fn cmp(&self, other: &Self, column: HeldColumn) -> Ordering where Self: Sized {
        match column {
            HeldColumn::Position | HeldColumn::Mark => self.position.cmp(&other.position),
            HeldColumn::ID => self.row.id.as_u64().cmp(&other.row.id.as_u64()),
            HeldColumn::Method => self.row.method.cmp(&other.row.method),
            HeldColumn::URI => self.row.uri.cmp(&other.row.uri),
            HeldColumn::Status => self.row.status_code.cmp(&other.row.status_code),
        }
    }
}

pub(super) type HeldTable = TableView<HeldTableItem, HeldColumn>;

pub(super) fn new_table() -> ResizedView<NamedView<HeldTable>> {
    HeldTable::new()
        .column(HeldColumn::Position, "#", |c| c.width(4).ordering(Ordering::Less))
        .column(HeldColumn::Mark, "", |c| c.width(2))
        .column(HeldColumn::ID, "ID", |c| c.width(8))
        .column(HeldColumn::Method, "Method", |c| c.width(10))
        .column(HeldColumn::URI, "URI", |c| c)
        .column(HeldColumn::Status, "Status", |c| c.width(8))
        .with_name(HELD_TABLE)
        .full_width()
}

pub(super) fn into_items(rows: Vec<HeldRow>) -> Vec<HeldTableItem> {
    rows.into_iter()
        .enumerate()
        .map(|(position, row)| HeldTableItem { position, row })
        .collect()
}

/// Replaces the listing with the session's current snapshot, keeping held order.
pub(super) fn fill(siv: &mut Cursive, rows: Vec<HeldRow>) {
    let items = into_items(rows);
    siv.call_on_name(HELD_TABLE, move |table: &mut HeldTable| {
        table.set_items(items);
        table.sort_by(HeldColumn::Position, Ordering::Less);
    });
}
