//! Spreadsheet-backed user store.
//!
//! The workbook holds a single `Users` sheet: a header row followed by one
//! row per user (`email`, `phone`, `password hash`). Every operation reads the
//! whole file and writes it back in full, so callers go through
//! [`UserSheetStore`], which serializes access with a mutex.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use tracing::debug;

pub const SHEET_NAME: &str = "Users";
pub const HEADER: [&str; 3] = ["Email", "Phone", "PasswordHash"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetUser {
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

/// Rows of the sheet plus email / phone lookups. Lookups return rows in sheet
/// order, so results match a top-to-bottom scan.
#[derive(Debug, Default)]
pub struct UserSheet {
    rows: Vec<SheetUser>,
    by_email: HashMap<String, Vec<usize>>,
    by_phone: HashMap<String, Vec<usize>>,
}

impl UserSheet {
    pub fn from_rows(rows: Vec<SheetUser>) -> Self {
        let mut sheet = UserSheet::default();
        for row in rows {
            sheet.push(row);
        }
        sheet
    }

    pub fn push(&mut self, user: SheetUser) {
        let idx = self.rows.len();
        self.by_email.entry(user.email.clone()).or_default().push(idx);
        self.by_phone.entry(user.phone.clone()).or_default().push(idx);
        self.rows.push(user);
    }

    pub fn rows(&self) -> &[SheetUser] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_email_or_phone(&self, email: &str, phone: &str) -> bool {
        self.by_email.contains_key(email) || self.by_phone.contains_key(phone)
    }

    /// Rows whose email or phone equals `identifier`.
    pub fn matching(&self, identifier: &str) -> Vec<&SheetUser> {
        let mut idx: Vec<usize> = self
            .by_email
            .get(identifier)
            .into_iter()
            .chain(self.by_phone.get(identifier))
            .flatten()
            .copied()
            .collect();
        idx.sort_unstable();
        idx.dedup();
        idx.into_iter().map(|i| &self.rows[i]).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    Created,
    Duplicate,
}

pub struct UserSheetStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UserSheetStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `user` unless its email or phone is already present. Creates
    /// the workbook with its header row on first use. Blocking.
    pub fn register(&self, user: SheetUser) -> anyhow::Result<Registered> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("sheet lock poisoned"))?;

        let mut sheet = if self.path.exists() {
            self.load()?
        } else {
            let empty = UserSheet::default();
            self.save(&empty)?;
            debug!(path = %self.path.display(), "created user sheet");
            empty
        };

        if sheet.contains_email_or_phone(&user.email, &user.phone) {
            return Ok(Registered::Duplicate);
        }

        sheet.push(user);
        self.save(&sheet)?;
        Ok(Registered::Created)
    }

    /// Current contents, or `None` when the workbook has not been created yet.
    /// Blocking.
    pub fn snapshot(&self) -> anyhow::Result<Option<UserSheet>> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("sheet lock poisoned"))?;
        if !self.path.exists() {
            return Ok(None);
        }
        self.load().map(Some)
    }

    fn load(&self) -> anyhow::Result<UserSheet> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let range = workbook
            .worksheet_range_at(0)
            .context("workbook has no sheets")?
            .context("read user sheet")?;

        let mut rows = range.rows().peekable();
        if let Some(first) = rows.peek() {
            if cell_text(first.first()).eq_ignore_ascii_case(HEADER[0]) {
                rows.next();
            }
        }

        let users = rows
            .map(|row| SheetUser {
                email: cell_text(row.first()),
                phone: cell_text(row.get(1)),
                password_hash: cell_text(row.get(2)),
            })
            .filter(|u| !(u.email.is_empty() && u.phone.is_empty()))
            .collect();
        Ok(UserSheet::from_rows(users))
    }

    fn save(&self, sheet: &UserSheet) -> anyhow::Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME).context("name user sheet")?;

        for (col, title) in HEADER.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, *title)
                .context("write header")?;
        }
        for (i, user) in sheet.rows().iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, &user.email).context("write email")?;
            worksheet.write_string(row, 1, &user.phone).context("write phone")?;
            worksheet
                .write_string(row, 2, &user.password_hash)
                .context("write password hash")?;
        }

        // Write next to the target then rename, so readers never see a
        // half-written workbook.
        let tmp = self.path.with_extension("xlsx.tmp");
        workbook
            .save(&tmp)
            .with_context(|| format!("save {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.trim().to_string(),
        // Phone numbers typed into the sheet by hand come back as floats.
        Some(Data::Float(f)) if f.fract() == 0.0 => format!("{}", *f as i64),
        Some(Data::Int(i)) => i.to_string(),
        Some(other) => other.to_string(),
    }
}
