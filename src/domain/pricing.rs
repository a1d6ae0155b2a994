//! Pricing engine: pure price computation for experiences and routes.
//!
//! No I/O and no side effects; callers pass in the catalog records the
//! price depends on.

use super::catalog::{Experience, PriceMode, Route};

/// Rounds an amount to 2 decimal places (the currency precision used
/// throughout pricing and deposits).
#[must_use]
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Total price for booking an experience on its own:
/// `individual_price × party_size`.
#[must_use]
pub fn experience_total(experience: &Experience, party_size: u32) -> f64 {
    round_currency(experience.individual_price * f64::from(party_size))
}

/// Per-participant price of an experience when sold inside a route.
///
/// Falls back to the individual price when no dedicated route price is
/// set.
#[must_use]
fn member_price(experience: &Experience) -> f64 {
    experience.route_price.unwrap_or(experience.individual_price)
}

/// Total price for booking a route.
///
/// - [`PriceMode::Sum`]: Σ over `members` of the member price ×
///   `party_size`.
/// - [`PriceMode::Flat`]: the flat route price when `party_size` meets
///   `min_party_for_flat`, otherwise the summed individual prices of the
///   members (route prices do not apply to a non-qualifying party).
///
/// `members` must be the route's experiences in any order; the caller
/// resolves them from the catalog.
#[must_use]
pub fn route_total(route: &Route, members: &[Experience], party_size: u32) -> f64 {
    match route.price_mode {
        PriceMode::Sum => round_currency(
            members
                .iter()
                .map(|m| member_price(m) * f64::from(party_size))
                .sum(),
        ),
        PriceMode::Flat => {
            if party_size >= route.min_party_for_flat
                && let Some(price) = route.price
            {
                round_currency(price)
            } else {
                round_currency(
                    members
                        .iter()
                        .map(|m| m.individual_price * f64::from(party_size))
                        .sum(),
                )
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::catalog::{DepositPolicy, ExperienceStatus};
    use crate::domain::ids::{ExperienceId, RouteId};

    fn experience(individual: f64, route_price: Option<f64>) -> Experience {
        Experience {
            id: ExperienceId::new(),
            name: "test".to_string(),
            individual_price: individual,
            route_price,
            deposit_policy: DepositPolicy::None,
            deposit_ttl_hours: None,
            status: ExperienceStatus::Online,
        }
    }

    fn route(mode: PriceMode, price: Option<f64>, min_party: u32) -> Route {
        Route {
            id: RouteId::new(),
            name: "test route".to_string(),
            price_mode: mode,
            price,
            min_party_for_flat: min_party,
            experience_ids: Vec::new(),
        }
    }

    #[test]
    fn experience_price_scales_with_party_size() {
        let exp = experience(150.0, None);
        assert_eq!(experience_total(&exp, 1), 150.0);
        assert_eq!(experience_total(&exp, 4), 600.0);
    }

    #[test]
    fn sum_mode_adds_member_prices() {
        let members = [experience(150.0, None), experience(120.0, None)];
        let r = route(PriceMode::Sum, None, 1);
        assert_eq!(route_total(&r, &members, 1), 270.0);
        assert_eq!(route_total(&r, &members, 2), 540.0);
    }

    #[test]
    fn sum_mode_prefers_route_price_of_members() {
        let members = [experience(150.0, Some(100.0)), experience(120.0, None)];
        let r = route(PriceMode::Sum, None, 1);
        assert_eq!(route_total(&r, &members, 1), 220.0);
    }

    #[test]
    fn flat_mode_applies_above_minimum_party() {
        let members = [experience(150.0, None), experience(120.0, None)];
        let r = route(PriceMode::Flat, Some(400.0), 3);
        assert_eq!(route_total(&r, &members, 3), 400.0);
        // Flat price ignores party size once the minimum is met.
        assert_eq!(route_total(&r, &members, 5), 400.0);
    }

    #[test]
    fn flat_mode_falls_back_below_minimum_party() {
        let members = [experience(150.0, None), experience(120.0, None)];
        let r = route(PriceMode::Flat, Some(400.0), 3);
        assert_eq!(route_total(&r, &members, 2), 540.0);
    }

    #[test]
    fn rounding_to_currency_precision() {
        let exp = experience(33.335, None);
        assert_eq!(experience_total(&exp, 3), 100.01);
        assert_eq!(round_currency(0.125), 0.13);
    }
}
