use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::ledger_errors::LedgerError;
use super::ledger_model::{TransactionDB, TransactionRecord, TransactionType, Wallet, WalletDB};
use super::ledger_traits::LedgerRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::{transactions, wallets};

/// Diesel-backed wallet and transaction store.
///
/// Mutations run inside an IMMEDIATE transaction: the write lock is taken
/// up front, so the balance check and the subsequent debit/credit cannot
/// interleave with another writer for the same owner.
pub struct LedgerRepository {
    pool: Arc<DbPool>,
}

impl LedgerRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn find_wallet(
        conn: &mut SqliteConnection,
        owner: &str,
        currency_code: &str,
    ) -> std::result::Result<Option<WalletDB>, LedgerError> {
        Ok(wallets::table
            .filter(wallets::owner_id.eq(owner))
            .filter(wallets::currency.eq(currency_code))
            .first::<WalletDB>(conn)
            .optional()?)
    }

    fn get_or_create_wallet(
        conn: &mut SqliteConnection,
        owner: &str,
        currency_code: &str,
    ) -> std::result::Result<WalletDB, LedgerError> {
        if let Some(wallet) = Self::find_wallet(conn, owner, currency_code)? {
            return Ok(wallet);
        }

        let wallet = WalletDB::empty(owner, currency_code);
        diesel::insert_into(wallets::table)
            .values(&wallet)
            .execute(conn)?;

        Ok(wallet)
    }

    fn set_balance(
        conn: &mut SqliteConnection,
        wallet_id: &str,
        new_balance: Decimal,
    ) -> std::result::Result<(), LedgerError> {
        diesel::update(wallets::table.find(wallet_id))
            .set((
                wallets::balance.eq(new_balance.to_string()),
                wallets::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        Ok(())
    }

    fn append_record(
        conn: &mut SqliteConnection,
        record: &TransactionDB,
    ) -> std::result::Result<(), LedgerError> {
        diesel::insert_into(transactions::table)
            .values(record)
            .execute(conn)?;

        Ok(())
    }
}

impl LedgerRepositoryTrait for LedgerRepository {
    fn get_wallet(&self, owner_id: &str, currency: &str) -> Result<Option<Wallet>> {
        let mut conn = get_connection(&self.pool)?;

        let wallet = Self::find_wallet(&mut conn, owner_id, currency)?;
        Ok(wallet.map(Wallet::from))
    }

    fn list_wallets(&self, owner_id: &str) -> Result<Vec<Wallet>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = wallets::table
            .filter(wallets::owner_id.eq(owner_id))
            .order_by(wallets::currency.asc())
            .load::<WalletDB>(&mut conn)?;

        Ok(rows.into_iter().map(Wallet::from).collect())
    }

    fn list_transactions(&self, owner_id: &str) -> Result<Vec<TransactionRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = transactions::table
            .filter(transactions::owner_id.eq(owner_id))
            .order_by(transactions::created_at.desc())
            .load::<TransactionDB>(&mut conn)?;

        Ok(rows.into_iter().map(TransactionRecord::from).collect())
    }

    fn deposit(
        &self,
        owner_id: &str,
        currency: &str,
        amount: Decimal,
    ) -> Result<TransactionRecord> {
        let mut conn = get_connection(&self.pool)?;

        let record = conn.immediate_transaction::<_, LedgerError, _>(|conn| {
            let wallet = Self::get_or_create_wallet(conn, owner_id, currency)?;
            Self::set_balance(conn, &wallet.id, wallet.balance_decimal() + amount)?;

            let record = TransactionDB::new(
                owner_id,
                TransactionType::Deposit,
                currency,
                currency,
                amount,
                amount,
                Decimal::ONE,
            );
            Self::append_record(conn, &record)?;

            Ok(record)
        })?;

        Ok(TransactionRecord::from(record))
    }

    fn exchange(
        &self,
        owner_id: &str,
        currency_from: &str,
        currency_to: &str,
        amount: Decimal,
        target_amount: Decimal,
        rate: Decimal,
    ) -> Result<TransactionRecord> {
        let mut conn = get_connection(&self.pool)?;

        let record = conn.immediate_transaction::<_, LedgerError, _>(|conn| {
            let source = Self::find_wallet(conn, owner_id, currency_from)?.ok_or_else(|| {
                LedgerError::NotFound(format!("owner holds no {} wallet", currency_from))
            })?;

            let source_balance = source.balance_decimal();
            if source_balance < amount {
                return Err(LedgerError::InsufficientFunds {
                    currency: currency_from.to_string(),
                    balance: source_balance,
                    requested: amount,
                });
            }

            Self::set_balance(conn, &source.id, source_balance - amount)?;

            let target = Self::get_or_create_wallet(conn, owner_id, currency_to)?;
            Self::set_balance(conn, &target.id, target.balance_decimal() + target_amount)?;

            let record = TransactionDB::new(
                owner_id,
                TransactionType::Exchange,
                currency_from,
                currency_to,
                amount,
                target_amount,
                rate,
            );
            Self::append_record(conn, &record)?;

            Ok(record)
        })?;

        Ok(TransactionRecord::from(record))
    }
}
