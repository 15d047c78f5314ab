//! Cross-crate scenarios.

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod discovery;
#[cfg(test)]
mod failures;
#[cfg(test)]
mod membership;
#[cfg(test)]
mod revocation;
