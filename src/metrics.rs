//! Offline ad performance evaluation.
//!
//! The analytics source is a stand-in that produces plausible numbers; the
//! derived calculations (CTR, retention, accuracy, CPA) are real and unit
//! tested so a live analytics backend can be swapped in behind the same
//! shape.

use rand::Rng;

/// Simulated analytics backend.
pub struct DummyAnalytics;

impl DummyAnalytics {
    pub fn impressions(&self, _product: &str) -> u64 {
        rand::rng().random_range(1000..=5000)
    }

    pub fn clicks(&self, _product: &str) -> u64 {
        rand::rng().random_range(100..=500)
    }

    pub fn unique_users(&self, _product: &str) -> u64 {
        rand::rng().random_range(500..=2000)
    }

    pub fn returning_users(&self, _product: &str) -> u64 {
        rand::rng().random_range(50..=500)
    }

    pub fn ad_spend(&self, _product: &str) -> f64 {
        rand::rng().random_range(500.0..=5000.0)
    }

    pub fn conversions(&self, _product: &str) -> u64 {
        rand::rng().random_range(10..=100)
    }
}

/// Click-through rate as a percentage.
pub fn click_through_rate(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    clicks as f64 / impressions as f64 * 100.0
}

/// Returning-user share as a percentage.
pub fn retention_rate(returning_users: u64, total_users: u64) -> f64 {
    if total_users == 0 {
        return 0.0;
    }
    returning_users as f64 / total_users as f64 * 100.0
}

/// Share of reference phrases that made it into the generated ad,
/// case-insensitively.
pub fn phrase_recall(generated: &str, reference_phrases: &[&str]) -> f64 {
    if reference_phrases.is_empty() {
        return 0.0;
    }
    let generated = generated.to_lowercase();
    let matched = reference_phrases
        .iter()
        .filter(|phrase| generated.contains(&phrase.to_lowercase()))
        .count();
    matched as f64 / reference_phrases.len() as f64
}

/// Cost per acquisition; infinite when nothing converted.
pub fn cost_per_acquisition(ad_spend: f64, conversions: u64) -> f64 {
    if conversions == 0 {
        return f64::INFINITY;
    }
    ad_spend / conversions as f64
}

/// Log a performance snapshot for a freshly generated ad.
pub fn report(analytics: &DummyAnalytics, product: &str) {
    let impressions = analytics.impressions(product);
    let clicks = analytics.clicks(product);
    let total_users = analytics.unique_users(product);
    let returning_users = analytics.returning_users(product);
    let spend = analytics.ad_spend(product);
    let conversions = analytics.conversions(product);

    tracing::info!(
        product,
        ctr = %format!("{:.2}%", click_through_rate(clicks, impressions)),
        retention = %format!("{:.2}%", retention_rate(returning_users, total_users)),
        cpa = %format!("${:.2}", cost_per_acquisition(spend, conversions)),
        "ad performance snapshot"
    );
}
