//! CLI commands

use crate::context::AppContext;
use credbank_engine::EngineError;
use tracing::info;

/// Record a verified payment and credit the account.
pub async fn record_payment(
    ctx: &mut AppContext,
    account: &str,
    reference: &str,
    amount: u64,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    info!(correlation_id, account, reference, amount, "record payment");

    match ctx.record_payment(account, amount, reference).await {
        Ok(receipt) if receipt.applied => {
            println!(
                "✅ Credited {} credits to {} (balance: {})",
                amount, account, receipt.balance
            );
        }
        Ok(receipt) => {
            println!(
                "↩️  Payment {} already applied (balance: {})",
                reference, receipt.balance
            );
        }
        Err(EngineError::PaymentRejected(reason)) => {
            println!("❌ Payment rejected: {}", reason);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

/// Consume credits from an account.
pub async fn consume(
    ctx: &mut AppContext,
    account: &str,
    amount: u64,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    info!(correlation_id, account, amount, "consume credits");

    let receipt = ctx.consume(account, amount).await?;
    if receipt.success {
        println!(
            "✅ Consumed {} credits from {} (remaining: {})",
            amount, account, receipt.balance
        );
    } else {
        println!(
            "❌ Insufficient credits: {} has {} but needs {}",
            account, receipt.balance, amount
        );
    }

    Ok(())
}

/// Check balance for an account.
pub async fn balance(ctx: &AppContext, account: &str) -> Result<(), anyhow::Error> {
    let balance = ctx.balance(account).await?;
    println!("{}: {} credits", account, balance);
    Ok(())
}

/// List journal history, most recent last.
pub async fn history(
    ctx: &AppContext,
    account: Option<&str>,
    limit: usize,
) -> Result<(), anyhow::Error> {
    let mut events = ctx.reader()?.read_all()?;
    if let Some(account) = account {
        events.retain(|event| event.account_id == account);
    }

    let skipped = events.len().saturating_sub(limit);
    if skipped > 0 {
        println!("... {} earlier events", skipped);
    }

    for event in events.into_iter().skip(skipped) {
        println!(
            "[{:>6}] {} {} {} (balance: {})",
            event.sequence,
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.account_id,
            serde_json::to_string(&event.kind)?,
            event.balance,
        );
    }

    Ok(())
}

/// Audit journal-derived balances against the store.
pub async fn audit(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let event_count = ctx.reader()?.read_all()?.len();
    let findings = ctx.audit().await?;

    if findings.is_empty() {
        println!("✅ Journal matches store balances ({} events)", event_count);
    } else {
        for finding in &findings {
            println!(
                "❌ {}: journal says {}, store says {}",
                finding.account, finding.journal_balance, finding.store_balance
            );
        }
        println!("{} account(s) out of sync", findings.len());
    }

    Ok(())
}

/// Show the active configuration.
pub fn show_config(ctx: &AppContext) -> Result<(), anyhow::Error> {
    println!("{}", serde_json::to_string_pretty(ctx.config())?);
    Ok(())
}
