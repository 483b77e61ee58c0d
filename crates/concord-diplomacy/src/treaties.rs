//! The treaty manager: signing, breaking and expiry.
//!
//! # Invariants
//!
//! - At most one *active* treaty of a given type binds a pair.
//! - Treaties are deactivated, never deleted.
//! - Voluntary signing requires the relation score to meet the type's gate.

use tracing::{debug, info};

use concord_types::{DynastyId, DynastyPair, EventType, Treaty, TreatyId, TreatyTerms, TreatyType};

use crate::config::DiplomacyConfig;
use crate::error::DiplomacyError;
use crate::events::Notice;
use crate::transaction::Transaction;

/// Relation change reason for a new treaty.
pub const TREATY_SIGNED: &str = "treaty_signed";
/// Relation change reason for a broken treaty.
pub const BREAK_TREATY: &str = "break_treaty";

/// Sign a treaty between `a` and `b`.
///
/// The treaty starts in `a`'s current year. `duration` of `None` means
/// permanent.
pub fn create_treaty(
    txn: &mut Transaction<'_>,
    a: DynastyId,
    b: DynastyId,
    treaty_type: TreatyType,
    duration: Option<u32>,
    terms: Option<TreatyTerms>,
) -> Result<Treaty, DiplomacyError> {
    if a == b {
        return Err(DiplomacyError::SelfDiplomacy(a));
    }
    let a_name = txn.name_of(a)?;
    let b_name = txn.name_of(b)?;
    validate_terms(a, b, treaty_type, terms.as_ref())?;

    let score = txn.score(a, b);
    let required = treaty_type.min_relation();
    if score < required {
        debug!(treaty_type = ?treaty_type, score, required, "Treaty rejected: relation too low");
        return Err(DiplomacyError::InsufficientRelation {
            treaty_type,
            required,
            actual: score,
        });
    }

    let treaty = sign(txn, a, b, treaty_type, duration, terms)?;
    let score = txn.apply_delta(a, b, TREATY_SIGNED, treaty_type.signing_bonus())?;

    let label = treaty_type.label();
    txn.emit(
        Notice::new(a, EventType::TreatySigned, format!("We signed a {label} with {b_name}."))
            .treaty(treaty.id),
    )?;
    txn.emit(
        Notice::new(b, EventType::TreatySigned, format!("We signed a {label} with {a_name}."))
            .treaty(treaty.id),
    )?;

    info!(
        treaty_id = %treaty.id,
        treaty_type = ?treaty_type,
        pair = %treaty.pair,
        score,
        "Treaty signed"
    );
    Ok(treaty)
}

/// Stage a new active treaty without gate, bonus or events.
///
/// Shared by voluntary signing and terms imposed at the peace table.
///
/// # Errors
///
/// Returns [`DiplomacyError::DuplicateActiveTreaty`] if the pair already has
/// an active treaty of this type.
pub(crate) fn sign(
    txn: &mut Transaction<'_>,
    a: DynastyId,
    b: DynastyId,
    treaty_type: TreatyType,
    duration: Option<u32>,
    terms: Option<TreatyTerms>,
) -> Result<Treaty, DiplomacyError> {
    if let Some(existing) = txn.active_treaty_of_type(a, b, treaty_type) {
        return Err(DiplomacyError::DuplicateActiveTreaty {
            treaty_type,
            existing,
        });
    }

    let treaty = Treaty {
        id: TreatyId::new(),
        treaty_type,
        pair: DynastyPair::new(a, b),
        start_year: txn.year_of(a)?,
        duration,
        active: true,
        terms,
    };
    txn.insert_treaty(treaty.clone());
    Ok(treaty)
}

/// Break an active treaty on behalf of `breaker`.
pub fn break_treaty(
    txn: &mut Transaction<'_>,
    config: &DiplomacyConfig,
    treaty_id: TreatyId,
    breaker: DynastyId,
) -> Result<Treaty, DiplomacyError> {
    let treaty = txn.treaty(treaty_id)?;
    if !treaty.active {
        return Err(DiplomacyError::TreatyNotActive(treaty_id));
    }
    let other = treaty.pair.other(breaker).ok_or(DiplomacyError::NotParty {
        dynasty: breaker,
        treaty: treaty_id,
    })?;
    let treaty_type = treaty.treaty_type;
    if txn.relation(breaker, other).is_none() {
        return Err(DiplomacyError::RelationNotFound(breaker, other));
    }
    let breaker_name = txn.name_of(breaker)?;
    let other_name = txn.name_of(other)?;

    txn.treaty_mut(treaty_id)?.active = false;
    let score = txn.apply_existing_delta(
        breaker,
        other,
        BREAK_TREATY,
        config.treaties.break_penalty.saturating_neg(),
    )?;
    let breaker_mut = txn.dynasty_mut(breaker)?;
    breaker_mut.honor = breaker_mut.honor.saturating_sub(config.treaties.break_honor_loss);

    let label = treaty_type.label();
    txn.emit(
        Notice::new(
            breaker,
            EventType::TreatyBroken,
            format!("We broke our {label} with {other_name}."),
        )
        .treaty(treaty_id),
    )?;
    txn.emit(
        Notice::new(
            other,
            EventType::TreatyBroken,
            format!("{breaker_name} broke their {label} with us."),
        )
        .treaty(treaty_id),
    )?;

    info!(treaty_id = %treaty_id, breaker = %breaker, score, "Treaty broken");
    txn.treaty(treaty_id).cloned()
}

/// Deactivate every active treaty whose term has run out by `year`.
///
/// Expiry carries no relation or honor penalty.
pub fn expire_treaties(
    txn: &mut Transaction<'_>,
    year: u32,
) -> Result<Vec<Treaty>, DiplomacyError> {
    let due: Vec<TreatyId> = txn
        .treaty_ids()
        .into_iter()
        .filter(|id| {
            txn.treaty(*id)
                .is_ok_and(|t| t.active && t.expiry_year().is_some_and(|end| end <= year))
        })
        .collect();

    let mut expired = Vec::with_capacity(due.len());
    for id in due {
        let treaty = txn.treaty_mut(id)?;
        treaty.active = false;
        let treaty = treaty.clone();
        let (first, second) = (treaty.pair.first(), treaty.pair.second());
        let first_name = txn.name_of(first)?;
        let second_name = txn.name_of(second)?;
        let label = treaty.treaty_type.label();

        txn.emit(
            Notice::new(
                first,
                EventType::TreatyExpired,
                format!("Our {label} with {second_name} has expired."),
            )
            .treaty(id),
        )?;
        txn.emit(
            Notice::new(
                second,
                EventType::TreatyExpired,
                format!("Our {label} with {first_name} has expired."),
            )
            .treaty(id),
        )?;
        info!(treaty_id = %id, year, "Treaty expired");
        expired.push(treaty);
    }
    Ok(expired)
}

/// Check that structured terms fit the treaty type and the parties.
fn validate_terms(
    a: DynastyId,
    b: DynastyId,
    treaty_type: TreatyType,
    terms: Option<&TreatyTerms>,
) -> Result<(), DiplomacyError> {
    match (treaty_type, terms) {
        (_, None) => Ok(()),
        (TreatyType::Vassalage, Some(TreatyTerms::Vassalage(v))) => {
            let pair = DynastyPair::new(a, b);
            if v.overlord == v.vassal || !pair.contains(v.overlord) || !pair.contains(v.vassal) {
                return Err(DiplomacyError::invalid_terms(
                    "overlord and vassal must be the two signatories",
                ));
            }
            if v.tribute_rate.is_sign_negative() || v.tribute_rate > rust_decimal::Decimal::ONE {
                return Err(DiplomacyError::invalid_terms(format!(
                    "tribute rate {} is outside [0, 1]",
                    v.tribute_rate
                )));
            }
            Ok(())
        }
        (TreatyType::Vassalage, Some(TreatyTerms::Clauses(_))) => Err(
            DiplomacyError::invalid_terms("vassalage terms must name overlord and vassal"),
        ),
        (other, Some(TreatyTerms::Vassalage(_))) => Err(DiplomacyError::invalid_terms(format!(
            "vassalage terms attached to a {}",
            other.label()
        ))),
        (_, Some(TreatyTerms::Clauses(_))) => Ok(()),
    }
}
