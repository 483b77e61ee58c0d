//! The peace negotiator: settling wars and collecting tribute.
//!
//! # Settlement
//!
//! The enforcing side must hold at least the configured war score; below it
//! the whole negotiation is rejected. Term categories are then processed in
//! order, each under its own savepoint:
//!
//! 1. **Territory**: the named territory passes from the loser to the winner.
//! 2. **Gold**: the loser pays the winner, clamped to the loser's treasury.
//! 3. **Vassalization**: attacker-enforced only; imposes a vassalage treaty.
//! 4. **Vassal release**: not supported; always rejected.
//!
//! A rejected category is rolled back on its own and reported in the
//! settlement. The war is then closed, the relation gets the peace bonus
//! and both sides are told.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use concord_types::{
    DynastyId, EventType, LedgerEntry, PeaceTerms, TerritoryId, TreatyId, TreatyTerms, TreatyType,
    VassalageTerms, War, WarId,
};

use crate::config::DiplomacyConfig;
use crate::error::DiplomacyError;
use crate::events::Notice;
use crate::transaction::Transaction;
use crate::treaties::sign;

/// Relation change reason for a peace settlement.
pub const PEACE_TREATY: &str = "peace_treaty";

/// What happened to one category of peace terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TermOutcome {
    /// The category was not part of the terms.
    NotRequested,
    /// The category was applied in full.
    Applied,
    /// Only part of a gold payment could be made.
    Partial {
        /// Gold demanded.
        requested: Decimal,
        /// Gold actually transferred.
        paid: Decimal,
    },
    /// The category failed validation and was rolled back.
    Rejected {
        /// Why the category was rejected.
        reason: String,
    },
}

impl TermOutcome {
    /// Whether the category changed any state.
    pub const fn took_effect(&self) -> bool {
        matches!(self, Self::Applied | Self::Partial { .. })
    }
}

/// Payload of a concluded peace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeaceSettlement {
    /// The closed war.
    pub war: War,
    /// Territory transfer result.
    pub territory: TermOutcome,
    /// Gold payment result.
    pub gold: TermOutcome,
    /// Vassalization result.
    pub vassalization: TermOutcome,
    /// Vassal release result.
    pub vassal_release: TermOutcome,
    /// The vassalage treaty imposed, if any.
    pub vassal_treaty: Option<TreatyId>,
    /// Relation score after the peace bonus.
    pub score: i64,
}

/// Settle `war_id` on the enforcing side's terms.
#[allow(clippy::too_many_lines)]
pub fn negotiate_peace(
    txn: &mut Transaction<'_>,
    config: &DiplomacyConfig,
    war_id: WarId,
    enforced_by_attacker: bool,
    terms: &PeaceTerms,
) -> Result<PeaceSettlement, DiplomacyError> {
    let war = txn.war(war_id)?.clone();
    if !war.active {
        return Err(DiplomacyError::WarNotActive(war_id));
    }
    let attacker_name = txn.name_of(war.attacker)?;
    let defender_name = txn.name_of(war.defender)?;

    let (winner, loser, leverage) = if enforced_by_attacker {
        (war.attacker, war.defender, war.attacker_war_score)
    } else {
        (war.defender, war.attacker, war.defender_war_score)
    };
    let required = config.war.peace_war_score_gate;
    if leverage < required {
        debug!(war_id = %war_id, leverage, required, "Peace rejected: insufficient war score");
        return Err(DiplomacyError::InsufficientWarScore {
            required,
            actual: leverage,
        });
    }

    let territory = match terms.territory {
        Some(territory) => settle(txn, "territory", |t| {
            transfer_territory(t, war_id, winner, loser, territory)
        }),
        None => TermOutcome::NotRequested,
    };

    let gold = match terms.gold {
        Some(requested) => settle(txn, "gold", |t| {
            pay_reparations(t, war_id, winner, loser, requested)
        }),
        None => TermOutcome::NotRequested,
    };

    let vassalization = if terms.vassalize {
        settle(txn, "vassalize", |t| {
            if !enforced_by_attacker {
                return Err(DiplomacyError::invalid_terms(
                    "only a victorious attacker can impose vassalage",
                ));
            }
            impose_vassalage(t, config, war_id, war.attacker, war.defender)
        })
    } else {
        TermOutcome::NotRequested
    };
    let vassal_treaty = if vassalization.took_effect() {
        txn.active_treaty_of_type(war.attacker, war.defender, TreatyType::Vassalage)
    } else {
        None
    };

    let vassal_release = if terms.release_vassal {
        settle(txn, "release_vassal", |_| {
            Err(DiplomacyError::UnsupportedTerm {
                term: "release_vassal",
            })
        })
    } else {
        TermOutcome::NotRequested
    };

    let end_year = txn.year_of(winner)?;
    let closed = {
        let war_mut = txn.war_mut(war_id)?;
        war_mut.active = false;
        war_mut.end_year = Some(end_year);
        war_mut.winner = Some(winner);
        war_mut.clone()
    };

    let score = txn.apply_delta(
        war.attacker,
        war.defender,
        PEACE_TREATY,
        config.war.peace_bonus,
    )?;

    txn.emit(
        Notice::new(
            war.attacker,
            EventType::PeaceSigned,
            format!("We made peace with {defender_name}."),
        )
        .war(war_id),
    )?;
    txn.emit(
        Notice::new(
            war.defender,
            EventType::PeaceSigned,
            format!("We made peace with {attacker_name}."),
        )
        .war(war_id),
    )?;

    info!(war_id = %war_id, winner = %winner, score, "Peace signed");
    Ok(PeaceSettlement {
        war: closed,
        territory,
        gold,
        vassalization,
        vassal_release,
        vassal_treaty,
        score,
    })
}

/// Run one term category under a savepoint.
fn settle<'s>(
    txn: &mut Transaction<'s>,
    term: &'static str,
    apply: impl FnOnce(&mut Transaction<'s>) -> Result<TermOutcome, DiplomacyError>,
) -> TermOutcome {
    match txn.savepoint(apply) {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!(term, error = %err, "Peace term rejected");
            TermOutcome::Rejected {
                reason: err.to_string(),
            }
        }
    }
}

fn transfer_territory(
    txn: &mut Transaction<'_>,
    war_id: WarId,
    winner: DynastyId,
    loser: DynastyId,
    territory: TerritoryId,
) -> Result<TermOutcome, DiplomacyError> {
    let record = txn.territory(territory)?;
    if record.controller != Some(loser) {
        return Err(DiplomacyError::invalid_terms(format!(
            "{} is not held by the losing side",
            record.name
        )));
    }
    let territory_name = record.name.clone();
    let winner_name = txn.name_of(winner)?;
    let loser_name = txn.name_of(loser)?;

    txn.territory_mut(territory)?.controller = Some(winner);

    txn.emit(
        Notice::new(
            winner,
            EventType::TerritoryGained,
            format!("{loser_name} ceded {territory_name} to us."),
        )
        .war(war_id)
        .territory(territory),
    )?;
    txn.emit(
        Notice::new(
            loser,
            EventType::TerritoryLost,
            format!("We ceded {territory_name} to {winner_name}."),
        )
        .war(war_id)
        .territory(territory),
    )?;
    info!(territory_id = %territory, winner = %winner, "Territory transferred");
    Ok(TermOutcome::Applied)
}

fn pay_reparations(
    txn: &mut Transaction<'_>,
    war_id: WarId,
    winner: DynastyId,
    loser: DynastyId,
    requested: Decimal,
) -> Result<TermOutcome, DiplomacyError> {
    if requested <= Decimal::ZERO {
        return Err(DiplomacyError::invalid_terms(format!(
            "reparations must be positive, got {requested}"
        )));
    }
    let available = txn.dynasty(loser)?.wealth.max(Decimal::ZERO);
    let paid = requested.min(available);
    if paid < requested {
        warn!(war_id = %war_id, %requested, %paid, "Partial reparations: payer treasury exhausted");
    }
    if paid.is_zero() {
        return Ok(TermOutcome::Partial {
            requested,
            paid,
        });
    }

    let winner_name = txn.name_of(winner)?;
    let loser_name = txn.name_of(loser)?;
    txn.transfer_reparations(loser, winner, paid, war_id)?;

    let details = serde_json::json!({ "requested": requested, "paid": paid });
    txn.emit(
        Notice::new(
            loser,
            EventType::ReparationsPaid,
            format!("We paid {paid} gold in reparations to {winner_name}."),
        )
        .war(war_id)
        .details(details.clone()),
    )?;
    txn.emit(
        Notice::new(
            winner,
            EventType::ReparationsReceived,
            format!("{loser_name} paid us {paid} gold in reparations."),
        )
        .war(war_id)
        .details(details),
    )?;

    if paid < requested {
        Ok(TermOutcome::Partial { requested, paid })
    } else {
        Ok(TermOutcome::Applied)
    }
}

fn impose_vassalage(
    txn: &mut Transaction<'_>,
    config: &DiplomacyConfig,
    war_id: WarId,
    overlord: DynastyId,
    vassal: DynastyId,
) -> Result<TermOutcome, DiplomacyError> {
    let terms = TreatyTerms::Vassalage(VassalageTerms {
        overlord,
        vassal,
        tribute_rate: config.treaties.vassal_tribute_rate,
    });
    let treaty = sign(txn, overlord, vassal, TreatyType::Vassalage, None, Some(terms))?;
    let overlord_name = txn.name_of(overlord)?;
    let vassal_name = txn.name_of(vassal)?;

    txn.emit(
        Notice::new(
            overlord,
            EventType::VassalageFormed,
            format!("{vassal_name} is now our vassal."),
        )
        .war(war_id)
        .treaty(treaty.id),
    )?;
    txn.emit(
        Notice::new(
            vassal,
            EventType::VassalageFormed,
            format!("We are now a vassal of {overlord_name}."),
        )
        .war(war_id)
        .treaty(treaty.id),
    )?;
    info!(treaty_id = %treaty.id, overlord = %overlord, vassal = %vassal, "Vassalage imposed");
    Ok(TermOutcome::Applied)
}

/// Collect tribute from every vassal bound by an active vassalage treaty.
///
/// Each vassal pays `floor(wealth * tribute_rate)` to its overlord. Zero
/// amounts are skipped.
pub fn collect_tribute(txn: &mut Transaction<'_>) -> Result<Vec<LedgerEntry>, DiplomacyError> {
    let due: Vec<(TreatyId, VassalageTerms)> = txn
        .treaty_ids()
        .into_iter()
        .filter_map(|id| txn.treaty(id).ok())
        .filter(|t| t.active && t.treaty_type == TreatyType::Vassalage)
        .filter_map(|t| {
            t.terms
                .as_ref()
                .and_then(TreatyTerms::as_vassalage)
                .map(|v| (t.id, v.clone()))
        })
        .collect();

    let mut entries = Vec::new();
    for (treaty_id, terms) in due {
        let wealth = txn.dynasty(terms.vassal)?.wealth.max(Decimal::ZERO);
        let amount = wealth
            .checked_mul(terms.tribute_rate)
            .ok_or_else(|| DiplomacyError::overflow("tribute amount"))?
            .floor();
        if amount <= Decimal::ZERO {
            continue;
        }

        let overlord_name = txn.name_of(terms.overlord)?;
        let vassal_name = txn.name_of(terms.vassal)?;
        let entry = txn.transfer_tribute(terms.vassal, terms.overlord, amount, treaty_id)?;

        txn.emit(
            Notice::new(
                terms.vassal,
                EventType::TributePaid,
                format!("We paid {amount} gold in tribute to {overlord_name}."),
            )
            .treaty(treaty_id),
        )?;
        txn.emit(
            Notice::new(
                terms.overlord,
                EventType::TributeReceived,
                format!("{vassal_name} paid us {amount} gold in tribute."),
            )
            .treaty(treaty_id),
        )?;
        info!(treaty_id = %treaty_id, %amount, "Tribute collected");
        entries.push(entry);
    }
    Ok(entries)
}
