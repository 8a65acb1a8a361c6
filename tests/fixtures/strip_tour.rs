//! Strip walking tour used across the integration tests.
//!
//! Real, routable locations that work with OSRM Nevada data.

use tour_route::polyline::{Coordinate, Polyline};
use tour_route::stitcher::Stop;

/// Where the tour starts and, with a return leg, ends.
pub const HOTEL: Coordinate = Coordinate::new(-115.1728, 36.1147);

/// (id, name, lng, lat, minutes to next stop)
const STOPS: &[(&str, &str, f64, f64, Option<u32>)] = &[
    ("wynn", "Wynn Las Vegas", -115.1658180, 36.1263781, Some(9)),
    ("public-house", "Public House", -115.1689317, 36.1219193, Some(8)),
    ("brooklyn-bowl", "Brooklyn Bowl", -115.1695094, 36.1175388, Some(11)),
    ("caesars", "Caesars Palace", -115.1745, 36.1162, Some(6)),
    ("bellagio", "Bellagio", -115.1767, 36.1126, Some(14)),
    ("burgr", "Gordon Ramsay BurGR", -115.1720818, 36.1107195, Some(12)),
    ("mgm", "MGM Grand", -115.1688720, 36.1023654, None),
];

/// Tour stops in their stored order. Every third stop is backed by a POI.
pub fn strip_stops() -> Vec<Stop> {
    STOPS
        .iter()
        .enumerate()
        .map(|(index, (id, name, lng, lat, minutes))| {
            let coord = Coordinate::new(*lng, *lat);
            let order = index as i32 + 1;
            let mut stop = if index % 3 == 0 {
                Stop::poi(id, name, order, &format!("poi-{}", id), coord)
            } else {
                Stop::free(id, name, order, coord)
            };
            stop.minutes_to_next = *minutes;
            stop
        })
        .collect()
}

/// Same stops, shuffled the way a content API might return them.
pub fn strip_stops_unsorted() -> Vec<Stop> {
    let mut stops = strip_stops();
    stops.reverse();
    stops.swap(1, 4);
    stops
}

/// A hand-drawn-looking line through every stop with `per_leg` samples per
/// leg and a small wobble off the straight path.
pub fn drawn_line(per_leg: usize) -> Polyline {
    let anchors: Vec<Coordinate> = strip_stops().iter().map(Stop::coordinate).collect();
    let mut line = Polyline::default();
    for (leg, pair) in anchors.windows(2).enumerate() {
        for step in 0..per_leg {
            let t = step as f64 / per_leg as f64;
            let wobble = ((leg * per_leg + step) as f64 * 0.9).sin() * 0.00002;
            line.push(Coordinate::new(
                pair[0].lng + (pair[1].lng - pair[0].lng) * t + wobble,
                pair[0].lat + (pair[1].lat - pair[0].lat) * t - wobble,
            ));
        }
    }
    if let Some(last) = anchors.last() {
        line.push(*last);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawn_line_length() {
        // 6 legs * 25 samples + the final stop.
        assert_eq!(drawn_line(25).len(), 151);
    }

    #[test]
    fn test_coordinates_on_the_strip() {
        for stop in strip_stops() {
            let coord = stop.coordinate();
            assert!(coord.lat > 36.0 && coord.lat < 36.2, "{} lat out of range", stop.name);
            assert!(coord.lng > -115.2 && coord.lng < -115.1, "{} lng out of range", stop.name);
        }
    }
}
