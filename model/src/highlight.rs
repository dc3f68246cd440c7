use crate::{PrimitiveID, TripGeometry, TripID};

/// At most one trip is selected at a time. Nothing times out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HighlightState {
    Idle,
    Selected(TripID),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HighlightEvent {
    ClickedTrip(TripID),
    ClickedBackground,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    /// Nothing is selected
    Neutral,
    /// Part of the selected trip
    Emphasized,
    /// Something else is selected
    Dimmed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub opacity: f64,
    pub line_weight: f64,
    pub marker_radius: f64,
}

impl Emphasis {
    pub fn style(self) -> Style {
        match self {
            Emphasis::Neutral => Style {
                opacity: 0.85,
                line_weight: 4.0,
                marker_radius: 5.0,
            },
            Emphasis::Emphasized => Style {
                opacity: 1.0,
                line_weight: 7.0,
                marker_radius: 8.0,
            },
            Emphasis::Dimmed => Style {
                opacity: 0.2,
                line_weight: 3.0,
                marker_radius: 4.0,
            },
        }
    }
}

impl HighlightState {
    /// Clicking a trip always takes over any previous selection.
    pub fn transition(self, event: HighlightEvent) -> Self {
        match event {
            HighlightEvent::ClickedTrip(id) => HighlightState::Selected(id),
            HighlightEvent::ClickedBackground => HighlightState::Idle,
        }
    }

    pub fn selected(&self) -> Option<&TripID> {
        match self {
            HighlightState::Idle => None,
            HighlightState::Selected(id) => Some(id),
        }
    }

    /// One entry per primitive, indexed by `PrimitiveID`. Selecting a trip that has nothing drawn
    /// leaves everything neutral.
    pub fn assign(&self, geometry: &TripGeometry) -> Vec<Emphasis> {
        let selected = match self.selected() {
            Some(id) if !geometry.primitives_of(id).is_empty() => id,
            _ => return vec![Emphasis::Neutral; geometry.primitives.len()],
        };
        let mut result = vec![Emphasis::Dimmed; geometry.primitives.len()];
        for PrimitiveID(idx) in geometry.primitives_of(selected) {
            result[*idx] = Emphasis::Emphasized;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_trip_geometry;
    use crate::fixtures::two_trips;

    fn t1() -> TripID {
        TripID("t1".to_string())
    }

    #[test]
    fn select_then_clear() {
        let geom = build_trip_geometry(&two_trips());
        let neutral = HighlightState::Idle.assign(&geom);
        assert!(neutral.iter().all(|e| *e == Emphasis::Neutral));

        let selected = HighlightState::Idle.transition(HighlightEvent::ClickedTrip(t1()));
        let styles = selected.assign(&geom);
        for id in geom.primitives_of(&t1()) {
            assert_eq!(styles[id.0], Emphasis::Emphasized);
        }
        for id in geom.primitives_of(&TripID("t2".to_string())) {
            assert_eq!(styles[id.0], Emphasis::Dimmed);
        }

        let cleared = selected.transition(HighlightEvent::ClickedBackground);
        assert_eq!(cleared, HighlightState::Idle);
        assert_eq!(cleared.assign(&geom), neutral);

        // The round trip reproduces the same emphasis
        let again = cleared.transition(HighlightEvent::ClickedTrip(t1()));
        assert_eq!(again.assign(&geom), styles);
    }

    #[test]
    fn new_selection_overrides() {
        let state = HighlightState::Selected(t1())
            .transition(HighlightEvent::ClickedTrip(TripID("t2".to_string())));
        assert_eq!(state.selected(), Some(&TripID("t2".to_string())));
    }

    #[test]
    fn idempotent_events() {
        let once = HighlightState::Idle.transition(HighlightEvent::ClickedTrip(t1()));
        let twice = once
            .clone()
            .transition(HighlightEvent::ClickedTrip(t1()));
        assert_eq!(once, twice);
        assert_eq!(
            HighlightState::Idle.transition(HighlightEvent::ClickedBackground),
            HighlightState::Idle
        );
    }

    #[test]
    fn unknown_trip_stays_neutral() {
        let geom = build_trip_geometry(&two_trips());
        let state = HighlightState::Selected(TripID("gone".to_string()));
        assert!(state.assign(&geom).iter().all(|e| *e == Emphasis::Neutral));
    }

    #[test]
    fn emphasized_is_bigger() {
        let neutral = Emphasis::Neutral.style();
        let emphasized = Emphasis::Emphasized.style();
        let dimmed = Emphasis::Dimmed.style();
        assert!(emphasized.opacity > neutral.opacity && neutral.opacity > dimmed.opacity);
        assert!(emphasized.line_weight > neutral.line_weight);
        assert!(dimmed.marker_radius < neutral.marker_radius);
    }
}
