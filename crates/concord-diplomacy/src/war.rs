//! The war manager: declarations and war score.
//!
//! At most one active war binds a pair, in either direction. Declaring war
//! first breaks every active peace-incompatible treaty between the parties
//! (non-aggression pacts and alliances), inside the same transaction.

use tracing::{debug, info};

use concord_types::{DynastyId, EventType, TerritoryId, War, WarGoal, WarId};

use crate::config::DiplomacyConfig;
use crate::error::DiplomacyError;
use crate::events::Notice;
use crate::transaction::Transaction;
use crate::treaties::break_treaty;

/// Relation change reason for a declaration of war.
pub const DECLARE_WAR: &str = "declare_war";

/// Declare war on `defender`.
pub fn declare_war(
    txn: &mut Transaction<'_>,
    config: &DiplomacyConfig,
    attacker: DynastyId,
    defender: DynastyId,
    war_goal: WarGoal,
    target_territory: Option<TerritoryId>,
) -> Result<War, DiplomacyError> {
    if attacker == defender {
        return Err(DiplomacyError::SelfDiplomacy(attacker));
    }
    let attacker_name = txn.name_of(attacker)?;
    let defender_name = txn.name_of(defender)?;

    if let Some(existing) = txn.active_war_between(attacker, defender) {
        debug!(war_id = %existing.id, "War rejected: already at war");
        return Err(DiplomacyError::DuplicateActiveWar(existing.id));
    }

    if txn.relation(attacker, defender).is_some() {
        let incompatible: Vec<_> = txn
            .active_treaties(attacker, defender)
            .into_iter()
            .filter(|t| t.treaty_type.is_peace_incompatible())
            .map(|t| t.id)
            .collect();
        for treaty_id in incompatible {
            break_treaty(txn, config, treaty_id, attacker)?;
        }
    }

    if let (WarGoal::Conquest, Some(territory)) = (war_goal, target_territory) {
        if txn.territory(territory)?.controller != Some(defender) {
            return Err(DiplomacyError::InvalidConquestTarget {
                territory,
                defender,
            });
        }
    }

    let war = War {
        id: WarId::new(),
        attacker,
        defender,
        war_goal,
        target_territory,
        start_year: txn.year_of(attacker)?,
        end_year: None,
        attacker_war_score: 0,
        defender_war_score: 0,
        active: true,
        winner: None,
    };
    txn.insert_war(war.clone());

    let score = txn.apply_delta(
        attacker,
        defender,
        DECLARE_WAR,
        config.war.declaration_penalty.saturating_neg(),
    )?;
    let attacker_mut = txn.dynasty_mut(attacker)?;
    attacker_mut.infamy = attacker_mut.infamy.saturating_add(config.war.declaration_infamy);

    let goal = war_goal.label();
    txn.emit(
        Notice::new(
            attacker,
            EventType::WarDeclared,
            format!("We declared a war of {goal} on {defender_name}."),
        )
        .war(war.id),
    )?;
    txn.emit(
        Notice::new(
            defender,
            EventType::WarDeclared,
            format!("{attacker_name} declared war on us."),
        )
        .war(war.id),
    )?;

    info!(
        war_id = %war.id,
        attacker = %attacker,
        defender = %defender,
        war_goal = ?war_goal,
        score,
        "War declared"
    );
    Ok(war)
}

/// Record the combat collaborator's latest war scores.
pub fn set_war_score(
    txn: &mut Transaction<'_>,
    war_id: WarId,
    attacker_score: i64,
    defender_score: i64,
) -> Result<War, DiplomacyError> {
    let war = txn.war_mut(war_id)?;
    if !war.active {
        return Err(DiplomacyError::WarNotActive(war_id));
    }
    war.attacker_war_score = attacker_score;
    war.defender_war_score = defender_score;
    debug!(war_id = %war_id, attacker_score, defender_score, "War score updated");
    Ok(war.clone())
}
