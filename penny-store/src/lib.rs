//! penny-store: SQLite persistence for users and their transactions.
//!
//! Foreign keys are on; deleting a user cascades to their transactions.
//! Statement-batch inserts run inside one SQL transaction so a partial
//! upload never persists.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{Connection, params};

use penny_core::{NewTransaction, Transaction, TransactionType, TxSource};

const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount >= 0),
    category TEXT NOT NULL,
    transaction_type TEXT NOT NULL,
    source TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_user_date
    ON transactions(user_id, date);
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("opening {}", db_path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().context("opening in-memory database")?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("setting pragmas")?;
        conn.execute_batch(SCHEMA).context("creating schema")?;
        Ok(Self { conn })
    }

    // --- users ---

    pub fn create_user(&self, name: &str) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            bail!("user name must not be empty");
        }
        if self.find_user(name)?.is_some() {
            bail!("user '{name}' already exists");
        }
        self.conn
            .execute("INSERT INTO users (name) VALUES (?1)", params![name])
            .context("creating user")?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn find_user(&self, name: &str) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM users WHERE name = ?1")?;
        let mut rows = stmt.query(params![name])?;
        match rows.next()? {
            Some(row) => Ok(Some(User {
                id: row.get(0)?,
                name: row.get(1)?,
            })),
            None => Ok(None),
        }
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM users ORDER BY name")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Delete a user and, by cascade, all their transactions
    pub fn delete_user(&self, name: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM users WHERE name = ?1", params![name])
            .context("deleting user")?;
        if n == 0 {
            bail!("no such user: {name}");
        }
        Ok(())
    }

    // --- transactions ---

    pub fn insert_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<Transaction> {
        insert_one(&self.conn, user_id, tx)
    }

    /// Insert a normalized statement batch atomically: either every record
    /// commits or, on any failure, none do.
    pub fn insert_batch(
        &mut self,
        user_id: i64,
        records: &[NewTransaction],
    ) -> Result<Vec<Transaction>> {
        let sql_tx = self.conn.transaction().context("starting statement batch")?;
        let mut created = Vec::with_capacity(records.len());
        for rec in records {
            created.push(insert_one(&sql_tx, user_id, rec)?);
        }
        sql_tx.commit().context("committing statement batch")?;
        Ok(created)
    }

    pub fn list_transactions(
        &self,
        user_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, description, amount, category, transaction_type, source, created_at
             FROM transactions WHERE user_id = ?1
             ORDER BY date DESC, id DESC LIMIT ?2 OFFSET ?3",
        )?;
        collect_transactions(&mut stmt, params![user_id, limit as i64, offset as i64])
    }

    pub fn all_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, description, amount, category, transaction_type, source, created_at
             FROM transactions WHERE user_id = ?1 ORDER BY date",
        )?;
        collect_transactions(&mut stmt, params![user_id])
    }

    pub fn transactions_for_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, description, amount, category, transaction_type, source, created_at
             FROM transactions
             WHERE user_id = ?1 AND strftime('%Y', date) = ?2 AND strftime('%m', date) = ?3
             ORDER BY date",
        )?;
        collect_transactions(
            &mut stmt,
            params![user_id, format!("{year:04}"), format!("{month:02}")],
        )
    }

    pub fn transactions_for_year(&self, user_id: i64, year: i32) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, description, amount, category, transaction_type, source, created_at
             FROM transactions
             WHERE user_id = ?1 AND strftime('%Y', date) = ?2
             ORDER BY date",
        )?;
        collect_transactions(&mut stmt, params![user_id, format!("{year:04}")])
    }
}

fn insert_one(conn: &Connection, user_id: i64, tx: &NewTransaction) -> Result<Transaction> {
    let created_at = Utc::now().naive_utc();
    conn.execute(
        "INSERT INTO transactions (user_id, date, description, amount, category, transaction_type, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user_id,
            tx.date.format(DATE_FMT).to_string(),
            tx.description,
            tx.amount,
            tx.category,
            tx.kind.as_str(),
            tx.source.as_str(),
            created_at.format(DATE_FMT).to_string(),
        ],
    )
    .with_context(|| format!("inserting transaction {:?}", tx.description))?;

    Ok(Transaction {
        id: conn.last_insert_rowid(),
        user_id,
        date: tx.date,
        description: tx.description.clone(),
        amount: tx.amount,
        category: tx.category.clone(),
        kind: tx.kind,
        source: tx.source,
        created_at,
    })
}

fn collect_transactions(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> Result<Vec<Transaction>> {
    let rows = stmt
        .query_map(params, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(
            |(id, user_id, date, description, amount, category, kind, source, created_at)| {
                Ok(Transaction {
                    id,
                    user_id,
                    date: parse_dt(&date)?,
                    description,
                    amount,
                    category,
                    kind: TransactionType::parse(&kind)
                        .ok_or_else(|| anyhow!("unknown transaction type in row: {kind}"))?,
                    source: TxSource::parse(&source)
                        .ok_or_else(|| anyhow!("unknown source in row: {source}"))?,
                    created_at: parse_dt(&created_at)?,
                })
            },
        )
        .collect()
}

fn parse_dt(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATE_FMT).with_context(|| format!("parsing stored date {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_tx(year: i32, month: u32, amount: f64, kind: TransactionType) -> NewTransaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(year, month, 10)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            description: "test".to_string(),
            amount,
            category: "Other".to_string(),
            kind,
            source: TxSource::BankStatement,
        }
    }

    #[test]
    fn test_create_and_find_user() {
        let store = Store::open_in_memory().unwrap();
        let u = store.create_user("saksham").unwrap();
        assert_eq!(store.find_user("saksham").unwrap(), Some(u));
        assert!(store.find_user("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let store = Store::open_in_memory().unwrap();
        store.create_user("a").unwrap();
        let err = store.create_user("a").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_user_delete_cascades() {
        let mut store = Store::open_in_memory().unwrap();
        let u = store.create_user("a").unwrap();
        store
            .insert_batch(u.id, &[new_tx(2024, 1, 10.0, TransactionType::Expense)])
            .unwrap();
        assert_eq!(store.all_transactions(u.id).unwrap().len(), 1);

        store.delete_user("a").unwrap();
        assert_eq!(store.all_transactions(u.id).unwrap().len(), 0);
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut store = Store::open_in_memory().unwrap();
        let u = store.create_user("a").unwrap();

        // second record violates the amount check, so nothing commits
        let batch = vec![
            new_tx(2024, 1, 10.0, TransactionType::Expense),
            new_tx(2024, 1, -5.0, TransactionType::Expense),
        ];
        assert!(store.insert_batch(u.id, &batch).is_err());
        assert_eq!(store.all_transactions(u.id).unwrap().len(), 0);
    }

    #[test]
    fn test_month_and_year_queries() {
        let mut store = Store::open_in_memory().unwrap();
        let u = store.create_user("a").unwrap();
        store
            .insert_batch(
                u.id,
                &[
                    new_tx(2024, 1, 100.0, TransactionType::Income),
                    new_tx(2024, 2, 20.0, TransactionType::Expense),
                    new_tx(2023, 2, 30.0, TransactionType::Expense),
                ],
            )
            .unwrap();

        assert_eq!(store.transactions_for_month(u.id, 2024, 2).unwrap().len(), 1);
        assert_eq!(store.transactions_for_year(u.id, 2024).unwrap().len(), 2);
        assert_eq!(store.transactions_for_year(u.id, 2023).unwrap().len(), 1);
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let store = Store::open_in_memory().unwrap();
        let u = store.create_user("a").unwrap();
        let tx = NewTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            description: "Coffee".to_string(),
            amount: 4.5,
            category: "Food & Dining".to_string(),
            kind: TransactionType::Expense,
            source: TxSource::BankStatement,
        };
        let created = store.insert_transaction(u.id, &tx).unwrap();
        let listed = store.list_transactions(u.id, 10, 0).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].description, "Coffee");
        assert_eq!(listed[0].amount, 4.5);
        assert_eq!(listed[0].kind, TransactionType::Expense);
        assert_eq!(listed[0].source, TxSource::BankStatement);
        assert_eq!(listed[0].date, tx.date);
    }

    #[test]
    fn test_transactions_scoped_to_owner() {
        let store = Store::open_in_memory().unwrap();
        let a = store.create_user("a").unwrap();
        let b = store.create_user("b").unwrap();
        store
            .insert_transaction(a.id, &new_tx(2024, 1, 10.0, TransactionType::Expense))
            .unwrap();
        assert_eq!(store.all_transactions(a.id).unwrap().len(), 1);
        assert!(store.all_transactions(b.id).unwrap().is_empty());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("penny.db");
        {
            let store = Store::open(&path).unwrap();
            store.create_user("a").unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert!(store.find_user("a").unwrap().is_some());
    }
}
