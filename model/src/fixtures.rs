//! Trips shared by tests across modules

use crate::{Endpoint, Leg, LinkedTrip, Transfer, TripID};

pub fn endpoint(lat: f64, lon: f64) -> Option<Endpoint> {
    Some(Endpoint {
        lat: Some(lat),
        lon: Some(lon),
        ..Default::default()
    })
}

pub fn leg(mode: &str, route: Vec<[f64; 2]>) -> Leg {
    Leg {
        mode: mode.to_string(),
        route: route
            .into_iter()
            .map(|[lat, lon]| vec![Some(lat), Some(lon)])
            .collect(),
        duration_min: Some(10.0),
        network_distance_km: Some(2.0),
        start_time: None,
    }
}

pub fn two_trips() -> Vec<LinkedTrip> {
    vec![
        LinkedTrip {
            linked_trip_id: TripID("t1".to_string()),
            origin: endpoint(40.70, -111.90),
            destination: endpoint(40.80, -111.80),
            legs: vec![
                leg("walk/bike", vec![[40.70, -111.90], [40.72, -111.88]]),
                leg("rail", vec![[40.72, -111.88], [40.80, -111.80]]),
            ],
            transfers: vec![Transfer {
                lat: Some(40.72),
                lon: Some(-111.88),
            }],
        },
        LinkedTrip {
            linked_trip_id: TripID("t2".to_string()),
            origin: endpoint(f64::NAN, -111.90),
            destination: None,
            legs: vec![
                leg("bus", vec![[40.65, -111.95], [40.66, -111.94]]),
                leg("car", vec![[40.66, -111.94]]),
            ],
            transfers: Vec::new(),
        },
    ]
}
