use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacilityMode {
    Bus,
    Rail,
}

const BUS_STOP_KEYWORDS: [&str; 2] = ["bus", "micro"];
const RAIL_STOP_KEYWORDS: [&str; 2] = ["trax", "frontrunner"];
// Named UTA rail services. Anything else in the route file is treated as bus.
const RAIL_LINES: [&str; 5] = ["blue line", "red line", "green line", "s line", "frontrunner"];

/// Classifies the free-text `mode` of a stop. None means the stop isn't drawn at all.
pub fn normalize_stop_mode(raw: Option<&str>) -> Option<FacilityMode> {
    let mode = raw?.to_lowercase();
    if BUS_STOP_KEYWORDS.iter().any(|k| mode.contains(k)) {
        return Some(FacilityMode::Bus);
    }
    if RAIL_STOP_KEYWORDS.iter().any(|k| mode.contains(k)) {
        return Some(FacilityMode::Rail);
    }
    None
}

/// Classifies the free-text `routetype` of a route. Anything that isn't a known rail line falls
/// back to bus, including a missing value.
pub fn normalize_route_mode(raw: Option<&str>) -> FacilityMode {
    let route_type = raw.unwrap_or("").to_lowercase();
    if RAIL_LINES.iter().any(|line| route_type.contains(line)) {
        FacilityMode::Rail
    } else {
        FacilityMode::Bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_modes() {
        assert_eq!(normalize_stop_mode(Some("Bus")), Some(FacilityMode::Bus));
        assert_eq!(
            normalize_stop_mode(Some("MicroTransit zone")),
            Some(FacilityMode::Bus)
        );
        assert_eq!(normalize_stop_mode(Some("TRAX")), Some(FacilityMode::Rail));
        assert_eq!(
            normalize_stop_mode(Some("FrontRunner Commuter Rail")),
            Some(FacilityMode::Rail)
        );
        assert_eq!(normalize_stop_mode(Some("Streetcar")), None);
        assert_eq!(normalize_stop_mode(Some("")), None);
        assert_eq!(normalize_stop_mode(None), None);
    }

    #[test]
    fn bus_keywords_win_over_rail() {
        // Same precedence as the keyword lists: bus is checked first
        assert_eq!(
            normalize_stop_mode(Some("bus bridge for trax")),
            Some(FacilityMode::Bus)
        );
    }

    #[test]
    fn route_modes() {
        assert_eq!(normalize_route_mode(Some("TRAX Blue Line")), FacilityMode::Rail);
        assert_eq!(normalize_route_mode(Some("S LINE")), FacilityMode::Rail);
        assert_eq!(normalize_route_mode(Some("FrontRunner")), FacilityMode::Rail);
        assert_eq!(normalize_route_mode(Some("Local")), FacilityMode::Bus);
        assert_eq!(normalize_route_mode(Some("Express")), FacilityMode::Bus);
        assert_eq!(normalize_route_mode(None), FacilityMode::Bus);
    }
}
