use nalgebra::{dmatrix, DMatrix};
use plotters::{prelude::*, style::full_palette::TEAL};

use cloudfit::curve::{
    evaluate,
    generation::{
        generate,
        Generation::{LeastSquaresFit, Manual},
    },
    points::{methods::fit::Ordering, ControlPoints, DataPoints, Points},
};

use crate::visualization::Limits;

mod visualization;

const PLOTS_DIR: &str = "doc-images/plots/";

const RED_100: RGBAColor = RGBAColor(255, 0, 0, 1.0);
const BLUE_100: RGBAColor = RGBAColor(0, 0, 255, 1.0);
const PURPLE_100: RGBAColor = RGBAColor(200, 0, 200, 1.0);

fn limits() -> Limits {
    Limits { min: vec![-3.0, -3.0], max: vec![3.0, 3.0] }
}

fn scattered_data_points() -> DataPoints {
    DataPoints::new(dmatrix![
        -2.50,-2.45,-2.15,-1.70,-1.50,-1.35,-1.20, 0.05, 0.20, 0.55, 0.65, 1.00, 1.20, 1.50, 1.75, 2.00, 2.15, 2.50;
        -2.55,-2.10,-2.45,-2.60,-2.15,-2.15,-1.85,-1.20,-0.70,-0.90,-0.20, 2.00, 0.95, 1.40,-0.70,-1.90,-1.70,-2.15;
    ])
}

/// Samples `m` points along a planar curve, the interior ones in scrambled order if `shuffle` is set.
fn sampled_data_points(m: usize, shuffle: bool) -> DataPoints {
    let polygon = dmatrix![
        -2.5,-1.5,-0.5, 1.0, 2.0, 0.0;
        -2.5, 1.0,-1.5,-2.0, 1.0, 2.0;
    ];
    let order = (0..m).map(|k| match k {
        k if !shuffle || k == 0 || k == m - 1 => k,
        k => 1 + (7 * (k - 1)) % (m - 2),
    });
    let columns: Vec<_> =
        order.map(|k| evaluate(&polygon, 3.0 * k as f64 / (m - 1) as f64).position).collect();
    DataPoints::new(DMatrix::from_columns(&columns))
}

fn closed_data_points(m: usize) -> DataPoints {
    DataPoints::new(DMatrix::from_fn(2, m, |r, c| {
        let phi = std::f64::consts::TAU * c as f64 / (m - 1) as f64;
        // an ellipse with a small ripple
        let radius = 1.0 + 0.1 * (3.0 * phi).sin();
        if r == 0 {
            2.0 * radius * phi.cos()
        } else {
            1.5 * radius * phi.sin()
        }
    }))
}

fn curve_plot() -> Result<(), Box<dyn std::error::Error>> {
    let c = generate(Manual {
        points: ControlPoints::new(dmatrix![
            -2.5,-1.5,-0.5, 1.0, 2.0, 0.0;
            -2.5, 1.0,-1.5,-2.0, 1.0, 2.0;
        ]),
    })?;
    visualization::generate_2d_plot("curve.svg", vec![(&c, RED_100)], &limits(), None);
    Ok(())
}

fn basis_plot() {
    visualization::generate_basis_plot("basis.svg", 7, &[RED_100, PURPLE_100, BLUE_100, TEAL.to_rgba()]);
}

fn generation_plots() -> Result<(), Box<dyn std::error::Error>> {
    let dp = scattered_data_points();
    visualization::generate_2d_plot("generation/points.svg", vec![], &limits(), Some(&dp));

    let manual = generate(Manual { points: ControlPoints::new(dp.matrix().clone()) })?;
    visualization::generate_2d_plot("generation/manual.svg", vec![(&manual, RED_100)], &limits(), Some(&dp));

    let fitted = generate(LeastSquaresFit { points: &dp, control_points: 7, ordering: Ordering::Ordered })?;
    visualization::generate_2d_plot("generation/fit.svg", vec![(&fitted, RED_100)], &limits(), Some(&dp));
    Ok(())
}

fn fit_plots() -> Result<(), Box<dyn std::error::Error>> {
    let ordered = sampled_data_points(30, false);
    let c = generate(LeastSquaresFit { points: &ordered, control_points: 6, ordering: Ordering::Ordered })?;
    visualization::generate_2d_plot("fit/ordered.svg", vec![(&c, BLUE_100)], &limits(), Some(&ordered));

    let unordered = sampled_data_points(30, true);
    let c = generate(LeastSquaresFit { points: &unordered, control_points: 6, ordering: Ordering::Unordered })?;
    visualization::generate_2d_plot("fit/unordered.svg", vec![(&c, RED_100)], &limits(), Some(&unordered));

    let closed = closed_data_points(41);
    let c = generate(LeastSquaresFit { points: &closed, control_points: 12, ordering: Ordering::Periodic })?;
    visualization::generate_2d_plot("fit/periodic.svg", vec![(&c, PURPLE_100)], &limits(), Some(&closed));
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for dir in ["generation", "fit"] {
        std::fs::create_dir_all(format!("{}{}", PLOTS_DIR, dir))?;
    }

    // Curve
    curve_plot()?;
    basis_plot();

    // Generation
    generation_plots()?;
    fit_plots()?;

    Ok(())
}
