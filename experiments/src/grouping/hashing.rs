use sha1::{Digest, Sha1};

const LONG_SCALE: u64 = 0xfffffffffffffff;

/// Salt used when picking a group, so the pick is independent of the rollout trial.
pub const CHOICE_SALT: &str = "variant";

/// Calculates a deterministic number between 0 and 1 for a rule and an identifier.
///
/// The key `"{rule_name}.{identifier}{salt}"` is hashed with SHA1; the first 8 bytes
/// shifted right by 4 bits (i.e. the first 15 hex characters of the digest) are divided
/// by `0xfffffffffffffff`. Given the same inputs it always returns the same number, and
/// the numbers are uniformly distributed, so showing something to 20% of users is
/// `lucky_number(..) < 0.2`.
pub fn lucky_number(rule_name: &str, identifier: &str, salt: &str) -> f64 {
    let hash_key = format!("{rule_name}.{identifier}{salt}");
    let digest = Sha1::digest(hash_key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let hash_val = u64::from_be_bytes(prefix) >> 4;

    hash_val as f64 / LONG_SCALE as f64
}

/// Weighted coin flip for `identifier`, succeeding for a `rate` share of identifiers.
///
/// A rate of 0 (or below) never succeeds and a rate of 1 (or above) always does.
pub fn bernoulli_trial(rule_name: &str, rate: f64, identifier: &str) -> bool {
    if rate <= 0.0 {
        return false;
    }
    if rate >= 1.0 {
        return true;
    }

    lucky_number(rule_name, identifier, "") < rate
}

/// Picks one of `choices` for `identifier`, spreading identifiers evenly across them.
/// Returns `None` only when `choices` is empty.
pub fn uniform_choice<'a, T: AsRef<str>>(
    rule_name: &str,
    choices: &'a [T],
    identifier: &str,
) -> Option<&'a str> {
    if choices.is_empty() {
        return None;
    }

    let hash = lucky_number(rule_name, identifier, CHOICE_SALT);
    // hash can be exactly 1.0 for the all-ones prefix
    let index = ((hash * choices.len() as f64) as usize).min(choices.len() - 1);

    choices.get(index).map(|choice| choice.as_ref())
}
