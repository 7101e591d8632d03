//! The transaction model and the database functions for storing and
//! querying transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, params};
use time::Date;

use crate::{Error, user::UserID};

/// The database ID of a transaction.
pub type TransactionId = i64;

/// Whether a transaction adds money to or removes money from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Money coming in, e.g. salary.
    Income,
    /// Money going out, e.g. rent.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidKind(other.to_string())),
        }
    }
}

/// An income or expense recorded by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction belongs to, e.g. "food".
    pub category: String,
    /// The amount of money as a positive magnitude. The sign is derived
    /// from `kind` during aggregation.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The user who owns the transaction.
    pub user_id: UserID,
}

/// The fields for creating or updating a transaction, after form validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionData {
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub date: Date,
    pub description: String,
}

/// Create the transaction table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // "transaction" is a reserved word in SQLite, so the name is quoted.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                user_id INTEGER NOT NULL REFERENCES user(id)
                )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_row_to_transaction(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let kind_string: String = row.get(1)?;
    let kind = TransactionKind::from_str(&kind_string).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("invalid transaction kind: {kind_string}").into(),
        )
    })?;
    let category = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;
    let user_id = UserID::new(row.get(6)?);

    Ok(Transaction {
        id,
        kind,
        category,
        amount,
        date,
        description,
        user_id,
    })
}

const TRANSACTION_COLUMNS: &str = "id, kind, category, amount, date, description, user_id";

/// Insert a new transaction owned by `user_id` into the database.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn create_transaction(
    data: TransactionData,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (kind, category, amount, date, description, user_id) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            data.kind.as_str(),
            data.category,
            data.amount,
            data.date,
            data.description,
            user_id.as_i64()
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        kind: data.kind,
        category: data.category,
        amount: data.amount,
        date: data.date,
        description: data.description,
        user_id,
    })
}

/// Get the transaction with `transaction_id`, regardless of its owner.
///
/// Callers that act on behalf of a user should check `user_id` on the
/// returned transaction and treat a mismatch as [Error::Forbidden].
///
/// # Errors
///
/// Returns [Error::NotFound] if no transaction has `transaction_id`.
pub fn get_transaction_by_id(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1"
        ))?
        .query_row(params![transaction_id], map_row_to_transaction)
        .map_err(|error| error.into())
}

/// Get the transaction with `transaction_id` only if it is owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no transaction with `transaction_id` is
/// owned by `user_id`.
pub fn get_transaction_for_user(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row(
            params![transaction_id, user_id.as_i64()],
            map_row_to_transaction,
        )
        .map_err(|error| error.into())
}

/// Get all transactions owned by `user_id`, newest first.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
            WHERE user_id = ?1 ORDER BY date DESC, id DESC"
        ))?
        .query_map(params![user_id.as_i64()], map_row_to_transaction)?
        .map(|transaction| transaction.map_err(|error| error.into()))
        .collect()
}

/// Get one page of transactions owned by `user_id`, newest first.
///
/// `page` is one-based.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_transactions_page_for_user(
    user_id: UserID,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    // SQLite takes the limit and offset as signed integers.
    let offset = (page.saturating_sub(1) * page_size) as i64;

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
            WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2 OFFSET ?3"
        ))?
        .query_map(
            params![user_id.as_i64(), page_size as i64, offset],
            map_row_to_transaction,
        )?
        .map(|transaction| transaction.map_err(|error| error.into()))
        .collect()
}

/// Get the number of transactions owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn count_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            params![user_id.as_i64()],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count as u64)
        .map_err(|error| error.into())
}

/// Overwrite the fields of the transaction with `transaction_id`, but only
/// if it is owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no transaction with `transaction_id` is
/// owned by `user_id`. A transaction owned by another user is reported the
/// same way as a missing one so that IDs cannot be probed through the edit
/// form.
pub fn update_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    data: TransactionData,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" \
        SET kind = ?1, category = ?2, amount = ?3, date = ?4, description = ?5 \
        WHERE id = ?6 AND user_id = ?7",
        params![
            data.kind.as_str(),
            data.category,
            data.amount,
            data.date,
            data.description,
            transaction_id,
            user_id.as_i64()
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the transaction with `transaction_id` on behalf of `user_id`.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if no transaction has `transaction_id`.
/// - [Error::Forbidden] if the transaction is owned by another user.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = get_transaction_by_id(transaction_id, connection)?;

    if transaction.user_id != user_id {
        return Err(Error::Forbidden);
    }

    connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1",
        params![transaction_id],
    )?;

    Ok(())
}


#[cfg(test)]
mod transaction_store_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize, user::UserID};

    use super::{
        TransactionData, TransactionKind, count_transactions_for_user, create_transaction,
        delete_transaction, get_transaction_by_id, get_transaction_for_user,
        get_transactions_for_user, get_transactions_page_for_user, update_transaction,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        conn.execute(
            "INSERT INTO user (username, email, password) VALUES ('alice', 'a@example.com', 'x'), \
            ('bob', 'b@example.com', 'x')",
            (),
        )
        .unwrap();

        conn
    }

    fn sample_data() -> TransactionData {
        TransactionData {
            kind: TransactionKind::Expense,
            category: "food".to_string(),
            amount: 12.5,
            date: date!(2025 - 06 - 01),
            description: "lunch".to_string(),
        }
    }

    #[test]
    fn create_and_get_transaction() {
        let conn = get_test_connection();
        let user_id = UserID::new(1);

        let created = create_transaction(sample_data(), user_id, &conn).unwrap();
        let retrieved = get_transaction_by_id(created.id, &conn).unwrap();

        assert_eq!(created, retrieved);
        assert_eq!(retrieved.user_id, user_id);
    }

    #[test]
    fn get_transaction_fails_with_missing_id() {
        let conn = get_test_connection();

        assert_eq!(get_transaction_by_id(999, &conn), Err(Error::NotFound));
    }

    #[test]
    fn get_transaction_for_user_hides_other_users_transactions() {
        let conn = get_test_connection();
        let created = create_transaction(sample_data(), UserID::new(1), &conn).unwrap();

        let result = get_transaction_for_user(created.id, UserID::new(2), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn transactions_are_sorted_newest_first() {
        let conn = get_test_connection();
        let user_id = UserID::new(1);
        let older = create_transaction(
            TransactionData {
                date: date!(2025 - 01 - 01),
                ..sample_data()
            },
            user_id,
            &conn,
        )
        .unwrap();
        let newer = create_transaction(
            TransactionData {
                date: date!(2025 - 02 - 01),
                ..sample_data()
            },
            user_id,
            &conn,
        )
        .unwrap();

        let transactions = get_transactions_for_user(user_id, &conn).unwrap();

        assert_eq!(transactions, vec![newer, older]);
    }

    #[test]
    fn list_only_includes_own_transactions() {
        let conn = get_test_connection();
        let mine = create_transaction(sample_data(), UserID::new(1), &conn).unwrap();
        create_transaction(sample_data(), UserID::new(2), &conn).unwrap();

        let transactions = get_transactions_for_user(UserID::new(1), &conn).unwrap();

        assert_eq!(transactions, vec![mine]);
    }

    #[test]
    fn pagination_returns_requested_page() {
        let conn = get_test_connection();
        let user_id = UserID::new(1);

        for day in 1..=7 {
            create_transaction(
                TransactionData {
                    date: date!(2025 - 06 - 01).replace_day(day).unwrap(),
                    ..sample_data()
                },
                user_id,
                &conn,
            )
            .unwrap();
        }

        let page_one = get_transactions_page_for_user(user_id, 1, 5, &conn).unwrap();
        let page_two = get_transactions_page_for_user(user_id, 2, 5, &conn).unwrap();

        assert_eq!(page_one.len(), 5);
        assert_eq!(page_two.len(), 2);
        assert_eq!(page_one.first().unwrap().date, date!(2025 - 06 - 07));
        assert_eq!(page_two.last().unwrap().date, date!(2025 - 06 - 01));
        assert_eq!(count_transactions_for_user(user_id, &conn), Ok(7));
    }

    #[test]
    fn update_transaction_overwrites_fields() {
        let conn = get_test_connection();
        let user_id = UserID::new(1);
        let created = create_transaction(sample_data(), user_id, &conn).unwrap();

        let new_data = TransactionData {
            kind: TransactionKind::Income,
            category: "income".to_string(),
            amount: 100.0,
            date: date!(2025 - 07 - 01),
            description: "salary".to_string(),
        };
        update_transaction(created.id, user_id, new_data.clone(), &conn).unwrap();

        let updated = get_transaction_by_id(created.id, &conn).unwrap();
        assert_eq!(updated.kind, new_data.kind);
        assert_eq!(updated.category, new_data.category);
        assert_eq!(updated.amount, new_data.amount);
        assert_eq!(updated.date, new_data.date);
        assert_eq!(updated.description, new_data.description);
    }

    #[test]
    fn update_transaction_fails_for_other_users_transaction() {
        let conn = get_test_connection();
        let created = create_transaction(sample_data(), UserID::new(1), &conn).unwrap();

        let result = update_transaction(created.id, UserID::new(2), sample_data(), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_removes_row() {
        let conn = get_test_connection();
        let user_id = UserID::new(1);
        let created = create_transaction(sample_data(), user_id, &conn).unwrap();

        delete_transaction(created.id, user_id, &conn).unwrap();

        assert_eq!(
            get_transaction_by_id(created.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_transaction_fails_with_missing_id() {
        let conn = get_test_connection();

        assert_eq!(
            delete_transaction(999, UserID::new(1), &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_transaction_fails_for_other_users_transaction() {
        let conn = get_test_connection();
        let created = create_transaction(sample_data(), UserID::new(1), &conn).unwrap();

        let result = delete_transaction(created.id, UserID::new(2), &conn);

        assert_eq!(result, Err(Error::Forbidden));
        assert!(get_transaction_by_id(created.id, &conn).is_ok());
    }
}
