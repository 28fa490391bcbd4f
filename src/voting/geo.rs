use serde::Serialize;

use super::group_by;
use crate::models::VoteRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoCluster {
    pub option: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    pub count: usize,
}

/// Votes per (option, exact coordinates) among records carrying a location.
///
/// Coordinates must match bit for bit to share a cluster; there is no
/// spatial binning. Output follows first-occurrence order.
pub fn geo_clusters(records: &[VoteRecord]) -> Vec<GeoCluster> {
    group_by(
        records,
        |record| {
            record.location.map(|point| {
                // `+ 0.0` folds -0.0 into 0.0 so both land in one cluster
                let [lng, lat] = point.coordinates.map(|c| (c + 0.0).to_bits());
                (record.option.as_str(), lng, lat)
            })
        },
        |count: &mut usize, _| *count += 1,
    )
    .into_iter()
    .map(|((option, lng, lat), count)| GeoCluster {
        option: option.to_string(),
        // Stored pairs are [longitude, latitude]
        latitude: f64::from_bits(lat),
        longitude: f64::from_bits(lng),
        count,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use crate::voting::fixtures::vote;

    #[test]
    fn identical_points_collapse_near_points_do_not() {
        let records = vec![
            vote("a", "Java").at(GeoPoint::new(23.3, 42.7)),
            vote("b", "Java").at(GeoPoint::new(23.3, 42.7)),
            vote("c", "Java").at(GeoPoint::new(23.30001, 42.7)),
        ];

        let clusters = geo_clusters(&records);
        assert_eq!(
            clusters,
            vec![
                GeoCluster {
                    option: "Java".to_string(),
                    latitude: 42.7,
                    longitude: 23.3,
                    count: 2
                },
                GeoCluster {
                    option: "Java".to_string(),
                    latitude: 42.7,
                    longitude: 23.30001,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn same_point_different_option_splits() {
        let here = GeoPoint::new(-0.12, 51.5);
        let records = vec![vote("a", "C").at(here), vote("b", "C#").at(here), vote("c", "C").at(here)];

        let clusters = geo_clusters(&records);
        assert_eq!(clusters.len(), 2);
        assert_eq!((clusters[0].option.as_str(), clusters[0].count), ("C", 2));
        assert_eq!((clusters[1].option.as_str(), clusters[1].count), ("C#", 1));
    }

    #[test]
    fn records_without_location_are_ignored() {
        let records = vec![vote("a", "Python"), vote("b", "Python").at(GeoPoint::new(2.35, 48.85))];
        let clusters = geo_clusters(&records);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count, 1);

        assert!(geo_clusters(&[vote("a", "Python")]).is_empty());
    }

    #[test]
    fn negative_zero_matches_zero() {
        let records = vec![
            vote("a", "C").at(GeoPoint::new(0.0, 10.0)),
            vote("b", "C").at(GeoPoint::new(-0.0, 10.0)),
        ];
        assert_eq!(geo_clusters(&records)[0].count, 2);
    }

    #[test]
    fn serializes_with_short_coordinate_names() {
        let cluster = GeoCluster {
            option: "Java".to_string(),
            latitude: 42.7,
            longitude: 23.3,
            count: 2,
        };
        let json = serde_json::to_value(&cluster).unwrap();
        assert_eq!(json["lat"], 42.7);
        assert_eq!(json["lng"], 23.3);
        assert_eq!(json["option"], "Java");
    }

    #[test]
    fn empty_store_gives_no_clusters() {
        assert!(geo_clusters(&[]).is_empty());
    }
}
