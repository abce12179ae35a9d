//! What a burst consists of

use rand::Rng;
use serde_json::{json, Value};
use std::ops::RangeInclusive;

/// One request in a burst
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Get(String),
    CreateOrder(Value),
}

impl Target {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Get(_) => "GET",
            Self::CreateOrder(_) => "POST",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Get(path) => path,
            Self::CreateOrder(_) => "/orders",
        }
    }
}

const GET_PATHS: &[&str] = &["/", "/users", "/products", "/orders", "/error"];

const ORDER_IDS: RangeInclusive<u64> = 1..=5;

/// Draw one request: a fixed GET, an order lookup or an order creation
pub fn pick_target<R: Rng + ?Sized>(rng: &mut R) -> Target {
    match rng.gen_range(0..GET_PATHS.len() + 2) {
        i if i < GET_PATHS.len() => Target::Get(GET_PATHS[i].to_string()),
        i if i == GET_PATHS.len() => Target::Get(format!("/orders/{}", rng.gen_range(ORDER_IDS))),
        _ => Target::CreateOrder(json!({
            "user_id": rng.gen_range(1..=3),
            "product_id": rng.gen_range(1..=3),
            "quantity": rng.gen_range(1..=5),
        })),
    }
}

/// Draw a burst whose size is uniform in `sizes`
pub fn plan_burst<R: Rng + ?Sized>(rng: &mut R, sizes: RangeInclusive<usize>) -> Vec<Target> {
    let size = rng.gen_range(sizes);
    (0..size).map(|_| pick_target(rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_burst_sizes_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let burst = plan_burst(&mut rng, 1..=5);
            assert!((1..=5).contains(&burst.len()));
            seen.insert(burst.len());
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_targets_cover_every_route_kind() {
        let mut rng = StdRng::seed_from_u64(9);
        let targets: Vec<Target> = (0..500).map(|_| pick_target(&mut rng)).collect();

        assert!(targets.iter().any(|t| t.path() == "/error"));
        assert!(targets.iter().any(|t| t.path().starts_with("/orders/")));
        assert!(targets.iter().any(|t| t.method() == "POST"));
        for path in GET_PATHS {
            assert!(targets.iter().any(|t| t.path() == *path), "{} never drawn", path);
        }
    }
}
