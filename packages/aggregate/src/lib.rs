#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Protest-to-country attribution.
//!
//! Corrects protest country names with a [`NameCorrectionTable`], counts
//! protests per country, and assigns each country a dense descending rank
//! that the choropleth maps onto an ordered color palette (rank 0 is the
//! darkest). Names that match no country are reported, never fatal.

pub mod normalize;

use std::collections::{BTreeMap, BTreeSet};

use protest_map_protest_models::{Country, Protest};

pub use normalize::NameCorrectionTable;

/// Count and rank computed for one country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryTally {
    /// Protests whose name equals the country name.
    pub count: u64,
    /// Dense descending rank over all countries' counts.
    pub rank: u32,
}

/// Names that did not join cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Protest names matching no country, with occurrence counts.
    pub unmatched_names: BTreeMap<String, u64>,
    /// Countries that received no protests, in input order.
    pub countries_without_protests: Vec<String>,
}

/// Tallies plus the join report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// One tally per input country, in input order.
    pub tallies: Vec<CountryTally>,
    /// Join diagnostics.
    pub report: AggregateReport,
}

/// Counts `protest_names` against `country_names` and ranks the result.
///
/// Protest names are expected to be normalized already. A name that
/// matches no country contributes to no count and is listed in
/// [`AggregateReport::unmatched_names`]. Countries sharing a name each get
/// that name's count.
#[must_use]
pub fn aggregate<P, C>(protest_names: P, country_names: &[C]) -> Aggregation
where
    P: IntoIterator,
    P::Item: AsRef<str>,
    C: AsRef<str>,
{
    let mut counts: BTreeMap<&str, u64> =
        country_names.iter().map(|n| (n.as_ref(), 0)).collect();
    let mut unmatched_names = BTreeMap::new();

    for name in protest_names {
        let name = name.as_ref();
        if let Some(count) = counts.get_mut(name) {
            *count += 1;
        } else {
            *unmatched_names.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    let per_country: Vec<u64> = country_names
        .iter()
        .map(|n| counts.get(n.as_ref()).copied().unwrap_or(0))
        .collect();
    let ranks = dense_rank(&per_country);

    let countries_without_protests = country_names
        .iter()
        .zip(&per_country)
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| name.as_ref().to_string())
        .collect();

    Aggregation {
        tallies: per_country
            .into_iter()
            .zip(ranks)
            .map(|(count, rank)| CountryTally { count, rank })
            .collect(),
        report: AggregateReport {
            unmatched_names,
            countries_without_protests,
        },
    }
}

/// Dense descending rank of `counts`.
///
/// The largest distinct non-zero count gets rank 0, the next largest rank
/// 1, and so on with no gaps. Every zero count gets the rank one past the
/// last non-zero rank, which is 0 when all counts are zero.
#[must_use]
pub fn dense_rank(counts: &[u64]) -> Vec<u32> {
    let distinct: BTreeSet<u64> = counts.iter().copied().filter(|&c| c > 0).collect();
    let by_count: BTreeMap<u64, u32> = distinct
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &c)| (c, u32::try_from(i).unwrap_or(u32::MAX)))
        .collect();
    let zero_rank = u32::try_from(distinct.len()).unwrap_or(u32::MAX);

    counts
        .iter()
        .map(|c| by_count.get(c).copied().unwrap_or(zero_rank))
        .collect()
}

/// Corrects each protest's country name, then fills in `count` and `rank`
/// on every country.
pub fn attribute_protests(
    countries: &mut [Country],
    protests: &[Protest],
    corrections: &NameCorrectionTable,
) -> AggregateReport {
    let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
    let aggregation = aggregate(
        protests.iter().map(|p| corrections.normalize(&p.country)),
        names.as_slice(),
    );

    for (country, tally) in countries.iter_mut().zip(&aggregation.tallies) {
        country.count = tally.count;
        country.rank = tally.rank;
    }

    let report = aggregation.report;
    log::info!(
        "Attributed {} of {} protests to {} countries",
        aggregation.tallies.iter().map(|t| t.count).sum::<u64>(),
        protests.len(),
        countries.len()
    );
    if !report.unmatched_names.is_empty() {
        log::warn!(
            "{} protest country names match no boundary: {:?}",
            report.unmatched_names.len(),
            report.unmatched_names.keys().collect::<Vec<_>>()
        );
    }
    log::debug!(
        "Countries without protests: {:?}",
        report.countries_without_protests
    );

    report
}
