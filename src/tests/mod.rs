/*
ENSnano, a 3d graphical application for DNA nanostructures.
    Copyright (C) 2021  Nicolas Levy <nicolaspierrelevy@gmail.com> and Nicolas Schabanel <nicolas.schabanel@ens-lyon.fr>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use ultraviolet::{DVec2, DVec3};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `n` points on a line parallel to the x axis, spaced by 1.
fn line(n: usize, start: DVec3) -> Vec<DVec3> {
    (0..n)
        .map(|i| start + DVec3::new(i as f64, 0., 0.))
        .collect()
}

fn small_group() -> VirtualHelixGroup {
    VirtualHelixGroup::new(GroupParameters {
        point_block_size: 8,
        label_block_size: 4,
        point_cache_size: 3,
        origin_cache_size: 3,
        ..Default::default()
    })
}

#[test]
fn query_then_remove_from_start() {
    init_logger();
    let mut group = VirtualHelixGroup::default();
    group
        .add_coordinates(0, &line(5, DVec3::zero()), true)
        .unwrap();
    let close = group.query_point(1.5, 0., 0., 0.);
    assert_eq!(
        close,
        vec![
            VirtualBase { label: 0, idx: 0 },
            VirtualBase { label: 0, idx: 1 }
        ]
    );
    group.remove_coordinates(0, 2, true).unwrap();
    assert_eq!(group.get_indices(0).unwrap(), &[0, 1, 2]);
    assert_eq!(group.get_coordinates(0).unwrap(), line(3, DVec3::new(2., 0., 0.)).as_slice());
    group.check_invariants().unwrap();
}

#[test]
fn append_and_prepend_round_trip() {
    init_logger();
    let mut group = small_group();
    group
        .add_coordinates(0, &line(3, DVec3::zero()), true)
        .unwrap();
    group
        .add_coordinates(1, &line(2, DVec3::unit_y()), true)
        .unwrap();

    let appended = line(4, DVec3::new(3., 0., 0.));
    group.add_coordinates(0, &appended, true).unwrap();
    let coords = group.get_coordinates(0).unwrap();
    assert_eq!(&coords[coords.len() - 4..], appended.as_slice());

    let prepended = line(2, DVec3::new(-2., 0., 0.));
    group.add_coordinates(0, &prepended, false).unwrap();
    let coords = group.get_coordinates(0).unwrap();
    assert_eq!(&coords[..2], prepended.as_slice());
    assert_eq!(coords, line(9, DVec3::new(-2., 0., 0.)).as_slice());
    assert_eq!(group.get_indices(0).unwrap(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);

    // The second helix was moved but is unchanged.
    assert_eq!(
        group.get_offset_and_size(1),
        Some(OffsetAndSize { offset: 9, size: 2 })
    );
    assert_eq!(group.get_coordinates(1).unwrap(), line(2, DVec3::unit_y()).as_slice());
    assert_eq!(group.get_indices(1).unwrap(), &[0, 1]);
    group.check_invariants().unwrap();
}

#[test]
fn removal_shifts_following_helices() {
    init_logger();
    let mut group = small_group();
    for label in 0..4 {
        let start = DVec3::new(0., 10. * label as f64, 0.);
        group.add_coordinates(label, &line(5, start), true).unwrap();
    }
    let before: BTreeMap<usize, (OffsetAndSize, Vec<DVec3>)> = group
        .labels()
        .collect::<Vec<_>>()
        .into_iter()
        .map(|l| {
            (
                l,
                (
                    group.get_offset_and_size(l).unwrap(),
                    group.get_coordinates(l).unwrap().to_vec(),
                ),
            )
        })
        .collect();

    group.remove_coordinates(1, 3, true).unwrap();

    for (label, (entry, coords)) in before {
        let new_entry = group.get_offset_and_size(label).unwrap();
        if label == 1 {
            assert_eq!(new_entry, OffsetAndSize { offset: 5, size: 2 });
            assert_eq!(group.get_coordinates(1).unwrap(), &coords[3..]);
            assert_eq!(group.get_indices(1).unwrap(), &[0, 1]);
        } else if entry.offset > 5 {
            assert_eq!(new_entry.offset, entry.offset - 3);
            assert_eq!(new_entry.size, entry.size);
            assert_eq!(group.get_coordinates(label).unwrap(), coords.as_slice());
        } else {
            assert_eq!(new_entry, entry);
        }
    }
    assert_eq!(group.total_points(), 17);
    group.check_invariants().unwrap();
}

#[test]
fn removal_from_end_keeps_indices() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(5, DVec3::zero()), true)
        .unwrap();
    group
        .add_coordinates(1, &line(5, DVec3::unit_z()), true)
        .unwrap();
    group.remove_coordinates(0, 2, false).unwrap();
    assert_eq!(group.get_indices(0).unwrap(), &[0, 1, 2]);
    assert_eq!(group.get_coordinates(0).unwrap(), line(3, DVec3::zero()).as_slice());
    assert_eq!(
        group.get_offset_and_size(1),
        Some(OffsetAndSize { offset: 3, size: 5 })
    );
    group.check_invariants().unwrap();
}

#[test]
fn emptied_helix_is_removed() {
    init_logger();
    let mut group = small_group();
    group
        .add_coordinates(0, &line(2, DVec3::zero()), true)
        .unwrap();
    group
        .add_coordinates(3, &line(2, DVec3::unit_y()), true)
        .unwrap();
    group
        .add_coordinates(5, &line(2, DVec3::unit_z()), true)
        .unwrap();
    assert_eq!(group.total_labels(), 3);

    group.remove_coordinates(3, 2, true).unwrap();
    assert_eq!(group.get_offset_and_size(3), None);
    assert_eq!(group.get_coordinates(3), Err(VhGroupError::UnknownLabel(3)));
    assert!(group.get_properties(3).is_err());
    assert_eq!(group.get_offset_and_size(5), Some(OffsetAndSize { offset: 2, size: 2 }));
    assert_eq!(group.total_labels(), 2);

    group.remove_coordinates(5, 2, false).unwrap();
    group.remove_coordinates(0, 2, false).unwrap();
    assert_eq!(group.total_labels(), 0);
    assert_eq!(group.total_points(), 0);
    assert_eq!(group.labels().count(), 0);
    assert!(group.query_origin(100., 0., 0.).is_empty());
    group.check_invariants().unwrap();
}

#[test]
fn removed_label_can_be_created_again() {
    let mut group = small_group();
    group
        .add_coordinates(2, &line(2, DVec3::zero()), true)
        .unwrap();
    group
        .set_property(2, VhPropertyKey::EulerZ, PropertyValue::Float(90.))
        .unwrap();
    group.remove_coordinates(2, 2, true).unwrap();
    group
        .add_coordinates(2, &line(1, DVec3::new(4., 5., 6.)), false)
        .unwrap();
    assert_eq!(group.get_indices(2).unwrap(), &[0]);
    assert_eq!(group.get_origin(2).unwrap(), DVec2::new(4., 5.));
    assert_eq!(group.get_properties(2).unwrap().euler_z, 10.);
}

#[test]
fn out_of_range_writes_are_rejected() {
    let mut group = small_group();
    let points = line(3, DVec3::zero());
    group.add_coordinates(0, &points, true).unwrap();

    let res = group.set_coordinates(0, &line(2, DVec3::unit_z()), 2);
    assert_eq!(
        res,
        Err(VhGroupError::OutOfRange {
            start: 2,
            length: 2,
            size: 3
        })
    );
    assert_eq!(group.get_coordinates(0).unwrap(), points.as_slice());
    assert!(group.set_z_coordinates(0, &[1., 2., 3., 4.], 0).is_err());
    assert!(matches!(
        group.remove_coordinates(0, 4, true),
        Err(VhGroupError::OutOfRange { .. })
    ));
    assert_eq!(group.total_points(), 3);
    assert_eq!(
        group.set_coordinates(1, &points, 0),
        Err(VhGroupError::UnknownLabel(1))
    );
    assert_eq!(
        group.remove_coordinates(7, 1, true),
        Err(VhGroupError::UnknownLabel(7))
    );
    assert!(matches!(
        group.get_coordinate(0, 3),
        Err(VhGroupError::OutOfRange { .. })
    ));
}

#[test]
fn huge_start_indices_are_out_of_range() {
    let mut group = small_group();
    let points = line(3, DVec3::zero());
    group.add_coordinates(0, &points, true).unwrap();

    assert_eq!(
        group.get_coordinate(0, usize::MAX),
        Err(VhGroupError::OutOfRange {
            start: usize::MAX,
            length: 1,
            size: 3
        })
    );
    assert_eq!(
        group.set_coordinates(0, &[DVec3::unit_z()], usize::MAX),
        Err(VhGroupError::OutOfRange {
            start: usize::MAX,
            length: 1,
            size: 3
        })
    );
    assert!(matches!(
        group.set_z_coordinates(0, &[1.], usize::MAX - 1),
        Err(VhGroupError::OutOfRange { .. })
    ));
    assert!(matches!(
        group.get_neighbors(0, 1., usize::MAX),
        Err(VhGroupError::OutOfRange { .. })
    ));
    assert_eq!(group.get_coordinates(0).unwrap(), points.as_slice());
}

#[test]
fn group_can_be_sent_to_another_thread() {
    fn assert_send<T: Send>() {}
    assert_send::<VirtualHelixGroup>();

    let mut group = small_group();
    group
        .add_coordinates(0, &line(2, DVec3::zero()), true)
        .unwrap();
    let handle = std::thread::spawn(move || group.total_points());
    assert_eq!(handle.join().unwrap(), 2);
}

#[test]
fn set_coordinates_in_place() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(4, DVec3::zero()), true)
        .unwrap();
    group
        .set_coordinates(0, &[DVec3::new(7., 7., 7.)], 1)
        .unwrap();
    group.set_z_coordinates(0, &[-1., -2.], 2).unwrap();
    assert_eq!(
        group.get_coordinates(0).unwrap(),
        &[
            DVec3::new(0., 0., 0.),
            DVec3::new(7., 7., 7.),
            DVec3::new(2., 0., -1.),
            DVec3::new(3., 0., -2.),
        ]
    );
    assert_eq!(group.get_coordinate(0, 1).unwrap(), DVec3::new(7., 7., 7.));
}

#[test]
fn coordinate_slices() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(5, DVec3::zero()), true)
        .unwrap();
    let last_two = group.get_coordinates_slice(0, -2, 5).unwrap();
    assert_eq!(last_two, line(2, DVec3::new(3., 0., 0.)).as_slice());
    assert!(matches!(
        group.get_coordinates_slice(0, 4, 2),
        Err(VhGroupError::InvalidSlice { .. })
    ));
}

#[test]
fn base_points_keep_their_geometry() {
    let mut group = small_group();
    let base = |x: f64| BasePoint {
        coordinate: DVec3::new(x, 0., 0.),
        direction: DVec3::unit_x(),
        fwd_phosphate: DVec3::new(x, 1., 0.),
        rev_phosphate: DVec3::new(x, -1., 0.),
    };
    group
        .add_base_points(0, &[base(0.), base(1.)], true)
        .unwrap();
    group
        .add_coordinates(0, &[DVec3::new(-1., 0., 0.)], false)
        .unwrap();
    assert_eq!(
        group.get_directions(0).unwrap(),
        &[DVec3::zero(), DVec3::unit_x(), DVec3::unit_x()]
    );
    assert_eq!(group.get_fwd_phosphates(0).unwrap()[2], DVec3::new(1., 1., 0.));

    group
        .set_phosphates(0, &[(DVec3::new(-1., 1., 0.), DVec3::new(-1., -1., 0.))], 0)
        .unwrap();
    group
        .set_directions(0, &[DVec3::unit_x()], 0)
        .unwrap();
    group
        .translate_coordinates(&[0], DVec3::new(0., 0., 2.))
        .unwrap();
    assert_eq!(group.get_rev_phosphates(0).unwrap()[0], DVec3::new(-1., -1., 2.));
    assert_eq!(group.get_directions(0).unwrap()[0], DVec3::unit_x());
}

#[test]
fn translation_moves_points_and_origins() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(3, DVec3::zero()), true)
        .unwrap();
    group
        .add_coordinates(1, &line(3, DVec3::new(0., 5., 0.)), true)
        .unwrap();
    let delta = DVec3::new(1., 2., 3.);

    // One unknown label: nothing moves.
    assert_eq!(
        group.translate_coordinates(&[0, 4], delta),
        Err(VhGroupError::UnknownLabel(4))
    );
    assert_eq!(group.get_coordinates(0).unwrap(), line(3, DVec3::zero()).as_slice());

    group.translate_coordinates(&[1], delta).unwrap();
    assert_eq!(group.get_coordinates(1).unwrap(), line(3, DVec3::new(1., 7., 3.)).as_slice());
    assert_eq!(group.get_origin(1).unwrap(), DVec2::new(1., 7.));
    assert_eq!(group.get_origin(0).unwrap(), DVec2::zero());
}

#[test]
fn mutation_invalidates_point_queries() {
    init_logger();
    let mut group = small_group();
    group
        .add_coordinates(0, &line(3, DVec3::zero()), true)
        .unwrap();
    let before = group.query_point(0.5, 10., 0., 0.);
    assert!(before.is_empty());
    assert_eq!(group.query_point(0.5, 10., 0., 0.), before);
    assert_eq!(group.point_cache_stats(), CacheStats { hits: 1, misses: 1 });

    group
        .set_coordinates(0, &[DVec3::new(10., 0., 0.)], 2)
        .unwrap();
    let after = group.query_point(0.5, 10., 0., 0.);
    assert_eq!(after, vec![VirtualBase { label: 0, idx: 2 }]);
    assert_eq!(group.point_cache_stats().misses, 2);

    group.remove_coordinates(0, 1, false).unwrap();
    assert!(group.query_point(0.5, 10., 0., 0.).is_empty());
    assert_eq!(group.point_cache_stats().misses, 3);

    group.translate_coordinates(&[0], DVec3::new(9., 0., 0.)).unwrap();
    assert_eq!(
        group.query_point(0.5, 10., 0., 0.),
        vec![VirtualBase { label: 0, idx: 1 }]
    );
    assert_eq!(group.point_cache_stats().misses, 4);
}

#[test]
fn origin_queries_survive_growth_of_existing_helices() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(3, DVec3::zero()), true)
        .unwrap();
    assert_eq!(group.query_origin(1., 0., 0.), vec![0]);
    group
        .add_coordinates(0, &line(3, DVec3::new(3., 0., 0.)), true)
        .unwrap();
    assert_eq!(group.query_origin(1., 0., 0.), vec![0]);
    assert_eq!(group.origin_cache_stats(), CacheStats { hits: 1, misses: 1 });

    // A new helix changes the answer.
    group
        .add_coordinates(1, &line(1, DVec3::new(0., 0.5, 0.)), true)
        .unwrap();
    assert_eq!(group.query_origin(1., 0., 0.), vec![0, 1]);
    assert_eq!(group.origin_cache_stats().misses, 2);

    // Partial removal does not.
    group.remove_coordinates(0, 1, true).unwrap();
    assert_eq!(group.query_origin(1., 0., 0.), vec![0, 1]);
    assert_eq!(group.origin_cache_stats().misses, 2);

    group.remove_coordinates(1, 1, true).unwrap();
    assert_eq!(group.query_origin(1., 0., 0.), vec![0]);
    assert_eq!(group.origin_cache_stats().misses, 3);
}

#[test]
fn point_cache_evicts_oldest_query_first() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(3, DVec3::zero()), true)
        .unwrap();
    for x in 0..4 {
        group.query_point(0.5, x as f64, 0., 0.);
    }
    assert_eq!(group.point_cache_stats().misses, 4);
    // The three most recent queries are remembered.
    for x in 1..4 {
        group.query_point(0.5, x as f64, 0., 0.);
    }
    assert_eq!(group.point_cache_stats(), CacheStats { hits: 3, misses: 4 });
    // The first one was forgotten.
    assert_eq!(
        group.query_point(0.5, 0., 0., 0.),
        vec![VirtualBase { label: 0, idx: 0 }]
    );
    assert_eq!(group.point_cache_stats().misses, 5);
}

#[test]
fn neighbors_exclude_the_helix_itself() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(4, DVec3::zero()), true)
        .unwrap();
    group
        .add_coordinates(1, &line(4, DVec3::new(0., 2., 0.)), true)
        .unwrap();
    group
        .add_coordinates(2, &line(4, DVec3::new(0., 50., 0.)), true)
        .unwrap();

    let neighbors = group.get_neighbors(0, 2.5, 0).unwrap();
    assert!(!neighbors.is_empty());
    assert!(neighbors.iter().all(|b| b.label == 1));
    assert!(neighbors.contains(&VirtualBase { label: 1, idx: 0 }));
    assert!(neighbors.contains(&VirtualBase { label: 1, idx: 1 }));

    let far = group.get_neighbors(0, 1000., 3).unwrap();
    assert_eq!(far.len(), 8);
    assert!(far.iter().all(|b| b.label != 0));

    let origin_neighbors = group.get_origin_neighbors(0, 2.5).unwrap();
    assert_eq!(origin_neighbors.len(), 1);
    assert!(origin_neighbors.contains(&1));
    let all = group.get_origin_neighbors(1, 1000.).unwrap();
    assert!(!all.contains(&1));
    assert_eq!(all.len(), 2);

    assert_eq!(group.get_neighbors(9, 1., 0), Err(VhGroupError::UnknownLabel(9)));
    assert!(group.get_origin_neighbors(9, 1.).is_err());
}

#[test]
fn storage_grows_by_blocks() {
    let mut group = small_group();
    for label in 0..10 {
        group
            .add_coordinates(label, &line(3, DVec3::new(0., label as f64, 0.)), label % 2 == 0)
            .unwrap();
    }
    assert_eq!(group.total_points(), 30);
    assert_eq!(group.total_labels(), 10);
    for label in 0..10 {
        assert_eq!(
            group.get_offset_and_size(label),
            Some(OffsetAndSize {
                offset: 3 * label,
                size: 3
            })
        );
        assert_eq!(group.get_properties(label).unwrap().name, format!("vh{}", label));
    }
    assert_eq!(group.query_point(0.1, 2., 9., 0.), vec![VirtualBase { label: 9, idx: 2 }]);
    group.check_invariants().unwrap();
}

#[test]
fn properties_by_column() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(1, DVec3::zero()), true)
        .unwrap();
    assert_eq!(
        group.get_property_by_name(0, "name").unwrap(),
        PropertyValue::Text("vh0".into())
    );
    group
        .set_property_by_name(0, "active_phos", "vh0.fwd.3.45")
        .unwrap();
    assert_eq!(
        group.get_property(0, VhPropertyKey::ActivePhos).unwrap(),
        PropertyValue::ActivePhos(Some(ActivePhos {
            vh_name: "vh0".into(),
            is_fwd: true,
            idx: 3,
            facing_angle: 45,
        }))
    );
    group.set_property_by_name(0, "bases_per_repeat", "32").unwrap();
    group.set_property_by_name(0, "turns_per_repeat", "3").unwrap();
    match group.get_property_by_name(0, "twist_per_base").unwrap() {
        PropertyValue::Float(twist) => assert!((twist - 33.75).abs() < 1e-9),
        value => panic!("unexpected value {:?}", value),
    }

    assert_eq!(
        group.set_property_by_name(0, "colour", "#ffffff"),
        Err(VhGroupError::UnknownProperty("colour".into()))
    );
    assert_eq!(
        group.set_property(1, VhPropertyKey::Color, PropertyValue::Color(0)),
        Err(VhGroupError::UnknownLabel(1))
    );
    assert!(matches!(
        group.set_property_by_name(0, "eulerZ", "north"),
        Err(VhGroupError::InvalidPropertyValue { .. })
    ));
}

#[test]
fn facing_angle_of_a_helix() {
    let mut group = small_group();
    group
        .add_coordinates(0, &line(1, DVec3::zero()), true)
        .unwrap();
    group
        .set_property(0, VhPropertyKey::EulerZ, PropertyValue::Float(0.))
        .unwrap();
    let angle = group.facing_angle(0, 1, true).unwrap();
    assert!((angle - 360. / 10.5).abs() < 1e-9);
    assert!(group.facing_angle(1, 0, true).is_err());
}

/// Apply random additions and removals and compare the group with a naive model.
#[test]
fn random_operations_keep_helices_contiguous() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut group = small_group();
    let mut model: BTreeMap<usize, Vec<DVec3>> = BTreeMap::new();
    let mut next_value = 0.;

    for _ in 0..500 {
        let label = rng.gen_range(0..12);
        if rng.gen_bool(0.6) || !model.contains_key(&label) {
            let n = rng.gen_range(1..6);
            let points: Vec<DVec3> = (0..n)
                .map(|i| DVec3::new(next_value + i as f64, label as f64, 0.))
                .collect();
            next_value += n as f64;
            let at_end = rng.gen_bool(0.5);
            group.add_coordinates(label, &points, at_end).unwrap();
            let helix = model.entry(label).or_insert_with(Vec::new);
            if at_end {
                helix.extend(points);
            } else {
                let mut new_helix = points;
                new_helix.extend(helix.iter().cloned());
                *helix = new_helix;
            }
        } else {
            let size = model[&label].len();
            let length = rng.gen_range(1..=size);
            let from_start = rng.gen_bool(0.5);
            group.remove_coordinates(label, length, from_start).unwrap();
            let helix = model.get_mut(&label).unwrap();
            if from_start {
                helix.drain(..length);
            } else {
                helix.truncate(size - length);
            }
            if helix.is_empty() {
                model.remove(&label);
            }
        }

        group.check_invariants().unwrap();
        assert_eq!(group.labels().collect::<Vec<_>>(), model.keys().cloned().collect::<Vec<_>>());
        for (label, helix) in model.iter() {
            assert_eq!(group.get_coordinates(*label).unwrap(), helix.as_slice());
            let indices: Vec<usize> = (0..helix.len()).collect();
            assert_eq!(group.get_indices(*label).unwrap(), indices.as_slice());
        }
        assert_eq!(
            group.total_points(),
            model.values().map(|h| h.len()).sum::<usize>()
        );
    }
}
