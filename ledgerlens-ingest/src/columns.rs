//! Column mapping: which statement header plays which role.

const DESCRIPTION_KEYS: &[&str] = &["description", "narration", "particulars", "details"];
const DEBIT_KEYS: &[&str] = &["debit", "withdrawal"];
const CREDIT_KEYS: &[&str] = &["credit", "deposit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Date,
    Description,
    Debit,
    Credit,
    Balance,
    Amount,
}

fn role_of(header: &str) -> Option<Role> {
    let h = header.trim().to_lowercase();
    let has_any = |keys: &[&str]| keys.iter().any(|k| h.contains(k));

    if h.contains("date") {
        Some(Role::Date)
    } else if has_any(DESCRIPTION_KEYS) {
        Some(Role::Description)
    } else if has_any(DEBIT_KEYS) {
        Some(Role::Debit)
    } else if has_any(CREDIT_KEYS) {
        Some(Role::Credit)
    } else if h.contains("balance") {
        Some(Role::Balance)
    } else if h.contains("amount") {
        Some(Role::Amount)
    } else {
        None
    }
}

/// Where the money is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    /// Separate debit/credit columns; either may be missing
    Split {
        debit: Option<usize>,
        credit: Option<usize>,
    },
    /// One signed or unsigned amount column
    Combined(usize),
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: AmountColumns,
    pub balance: Option<usize>,
}

impl ColumnMap {
    /// Map header names to roles. The first header matching a role takes it.
    /// `None` unless both a date and a description column exist.
    pub fn detect<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut date = None;
        let mut description = None;
        let mut debit = None;
        let mut credit = None;
        let mut balance = None;
        let mut amount = None;

        for (idx, header) in headers.into_iter().enumerate() {
            let slot = match role_of(header) {
                Some(Role::Date) => &mut date,
                Some(Role::Description) => &mut description,
                Some(Role::Debit) => &mut debit,
                Some(Role::Credit) => &mut credit,
                Some(Role::Balance) => &mut balance,
                Some(Role::Amount) => &mut amount,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }

        // Debit/credit beat a generic amount column
        let amount = match (debit, credit, amount) {
            (None, None, Some(idx)) => AmountColumns::Combined(idx),
            (None, None, None) => AmountColumns::Missing,
            (debit, credit, _) => AmountColumns::Split { debit, credit },
        };

        Some(ColumnMap {
            date: date?,
            description: description?,
            amount,
            balance,
        })
    }
}
