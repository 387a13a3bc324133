// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

macro_rules! assert_almost_eq {
    ($a:expr, $b:expr) => {
        assert_almost_eq!($a, $b, 1e-6)
    };
    ($a:expr, $b:expr, $eps:expr) => {{
        let (a, b): (f64, f64) = ($a, $b);
        assert!(
            (a - b).abs() <= $eps * f64::max(1.0, b.abs()),
            "assertion failed: {} ≈ {}",
            a,
            b
        )
    }};
}

macro_rules! tags {
    {} => { Vec::<(String, String)>::new() };
    {$( $k:literal : $v:literal ),+ $(,)?} => {
        vec![ $( ($k.to_string(), $v.to_string()) ),+ ]
    };
}

pub(crate) fn node(id: i64, lat: f64, lon: f64) -> crate::NodeRecord {
    crate::NodeRecord {
        id,
        position: crate::Coordinate::new(lat, lon),
        tags: Vec::new(),
    }
}

pub(crate) fn road(id: i64, nodes: &[i64]) -> crate::WayRecord {
    crate::WayRecord {
        id,
        tags: tags! {"highway": "residential"},
        nodes: nodes.to_vec(),
    }
}
