use crate::loader::has_comment;
use crate::types::{AgeByCategoryRow, Category, DistributionRow, Report, SummaryStats, Urgency, ZoneAccessRow};
use crate::util::{average, format_int, format_number, median, percentage};
use std::collections::{HashMap, HashSet};

/// Count rows per value, sorted by count descending then value ascending.
fn distribution<'a, I>(values: I) -> Vec<DistributionRow>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
        total += 1;
    }
    let mut sorted: Vec<(&str, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
        .into_iter()
        .map(|(value, count)| DistributionRow {
            value: value.to_string(),
            count: format_int(count),
            share: format_number(percentage(count, total), 2),
        })
        .collect()
}

pub fn category_distribution(data: &[Report]) -> Vec<DistributionRow> {
    distribution(data.iter().map(|r| r.category.label()))
}

pub fn urgency_distribution(data: &[Report]) -> Vec<DistributionRow> {
    distribution(data.iter().map(|r| r.urgency.label()))
}

pub fn city_distribution(data: &[Report]) -> Vec<DistributionRow> {
    distribution(data.iter().map(|r| r.city.as_str()))
}

pub fn gender_distribution(data: &[Report]) -> Vec<DistributionRow> {
    distribution(data.iter().map(|r| r.gender.as_str()))
}

/// Share of `flag` per zone (`No` = urban, `Si` = rural).
fn by_zone(data: &[Report], flag: fn(&Report) -> bool) -> Vec<ZoneAccessRow> {
    [false, true]
        .iter()
        .filter_map(|&rural| {
            let zone: Vec<&Report> = data.iter().filter(|r| r.rural_zone == rural).collect();
            if zone.is_empty() {
                return None;
            }
            let yes = zone.iter().filter(|r| flag(r)).count();
            Some(ZoneAccessRow {
                zone: if rural { "Si" } else { "No" }.to_string(),
                no_pct: format_number(percentage(zone.len() - yes, zone.len()), 2),
                yes_pct: format_number(percentage(yes, zone.len()), 2),
                total: format_int(zone.len()),
            })
        })
        .collect()
}

pub fn internet_by_zone(data: &[Report]) -> Vec<ZoneAccessRow> {
    by_zone(data, |r| r.internet_access)
}

pub fn attention_by_zone(data: &[Report]) -> Vec<ZoneAccessRow> {
    by_zone(data, |r| r.prior_attention)
}

pub fn mean_age_by_category(data: &[Report]) -> Vec<AgeByCategoryRow> {
    Category::ALL
        .iter()
        .filter_map(|&c| {
            let ages: Vec<f64> = data.iter().filter(|r| r.category == c).map(|r| r.age).collect();
            if ages.is_empty() {
                return None;
            }
            Some(AgeByCategoryRow {
                category: c.label().to_string(),
                mean_age: format_number(average(&ages), 2),
            })
        })
        .collect()
}

pub fn generate_summary(data: &[Report]) -> SummaryStats {
    let categories: HashSet<Category> = data.iter().map(|r| r.category).collect();
    let cities: HashSet<&str> = data.iter().map(|r| r.city.as_str()).collect();
    SummaryStats {
        total_reports: data.len(),
        total_categories: categories.len(),
        total_cities: cities.len(),
        urgent_reports: data.iter().filter(|r| r.urgency == Urgency::Urgent).count(),
        missing_comments: data.iter().filter(|r| !has_comment(r)).count(),
        median_age: median(data.iter().map(|r| r.age).collect()),
    }
}
