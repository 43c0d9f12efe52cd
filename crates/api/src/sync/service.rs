//! Settlement sync orchestration.
//!
//! Pulls the settlement snapshot and citizen roster from the game API and
//! writes them through the repositories. Settlement rows are replaced
//! wholesale; character claim fields are never touched. A tier increase
//! unlocks research nodes, and a treasury change appends a ledger entry so
//! the dashboard chart has history without a separate import job.

use std::collections::HashSet;
use std::time::Instant;

use palisade_core::skills;
use palisade_db::models::character::UpsertCharacter;
use palisade_db::models::settlement::{Settlement, UpsertSettlement};
use palisade_db::repositories::{CharacterRepo, ResearchRepo, SettlementRepo, TreasuryRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::sync::game_client::GameDataClient;

/// How much of the settlement to sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Settlement snapshot + roster + research availability + treasury.
    #[default]
    Full,
    /// Roster only; settlement game-data fields are left as they are.
    MembersOnly,
}

/// Counts reported back to the caller after a sync.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub members_found: u32,
    pub members_added: u32,
    pub members_updated: u32,
    pub citizens_found: u32,
    pub research_unlocked: u64,
    pub duration_ms: u64,
}

/// Run one sync for the given settlement.
///
/// Upstream failures surface as [`AppError::Upstream`] with the upstream
/// message intact; nothing written before the failure is rolled back (the
/// next successful sync converges the data).
pub async fn sync_settlement(
    pool: &PgPool,
    game: &dyn GameDataClient,
    settlement: &Settlement,
    mode: SyncMode,
) -> Result<SyncReport, AppError> {
    let started = Instant::now();
    let mut settlement_tier = settlement.tier;

    if mode == SyncMode::Full {
        let snapshot = game
            .fetch_settlement(&settlement.entity_id)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let previous_treasury = TreasuryRepo::summary(pool, settlement.id).await?.balance;

        let updated = SettlementRepo::upsert(
            pool,
            &UpsertSettlement {
                entity_id: snapshot.entity_id,
                name: snapshot.name,
                tier: snapshot.tier,
                treasury: snapshot.treasury,
                supplies: snapshot.supplies,
                tiles: snapshot.tiles,
                population: snapshot.population,
                leader_name: snapshot.leader_name,
            },
        )
        .await?;
        settlement_tier = updated.tier;

        if updated.treasury != previous_treasury {
            TreasuryRepo::append(
                pool,
                settlement.id,
                updated.treasury - previous_treasury,
                "Settlement sync",
            )
            .await?;
        }
    }

    let roster = game
        .fetch_roster(&settlement.entity_id)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let existing: HashSet<String> = CharacterRepo::list_by_settlement(pool, settlement.id, false)
        .await?
        .into_iter()
        .map(|c| c.entity_id)
        .collect();

    let mut members_found = 0u32;
    let mut members_added = 0u32;
    let mut members_updated = 0u32;

    for citizen in &roster {
        if !citizen.is_member {
            continue;
        }
        members_found += 1;

        let skills_json =
            serde_json::to_value(&citizen.skills).unwrap_or_else(|_| serde_json::json!({}));
        CharacterRepo::upsert(
            pool,
            &UpsertCharacter {
                entity_id: citizen.entity_id.clone(),
                settlement_id: settlement.id,
                name: citizen.name.clone(),
                top_profession: skills::top_profession(&citizen.skills).map(str::to_string),
                total_level: skills::total_level(&citizen.skills),
                skills: skills_json,
            },
        )
        .await?;

        if existing.contains(&citizen.entity_id) {
            members_updated += 1;
        } else {
            members_added += 1;
        }
    }

    let research_unlocked = if mode == SyncMode::Full {
        ResearchRepo::refresh_availability(pool, settlement.id, settlement_tier).await?
    } else {
        0
    };

    let report = SyncReport {
        members_found,
        members_added,
        members_updated,
        citizens_found: roster.len() as u32,
        research_unlocked,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    tracing::info!(
        settlement_id = settlement.id,
        members_found = report.members_found,
        members_added = report.members_added,
        citizens_found = report.citizens_found,
        duration_ms = report.duration_ms,
        "Settlement sync finished"
    );

    Ok(report)
}
