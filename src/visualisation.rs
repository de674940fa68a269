// src/visualisation.rs

use crate::field::Field2D;
use plotters::prelude::*;

/// Map a field value to a blue–white–red colour using a *local* min/max,
/// so small variations are still visible.
///
/// min maps to blue, max maps to red, midpoint to white.
fn value_to_color(v: f64, min_v: f64, max_v: f64) -> RGBColor {
    // Protect against min ≈ max (e.g. a uniform field)
    let mut lo = min_v;
    let mut hi = max_v;
    if !lo.is_finite() || !hi.is_finite() || (hi - lo).abs() < 1e-12 {
        lo = -1.0;
        hi = 1.0;
    }

    let x = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);

    // blue–white–red: x=0 -> blue, x=0.5 -> white, x=1 -> red
    let r = (255.0 * x) as u8;
    let b = (255.0 * (1.0 - x)) as u8;
    let g = (255.0 * (1.0 - (2.0 * (x - 0.5).abs()))).clamp(0.0, 255.0) as u8;

    RGBColor(r, g, b)
}

/// Save the interior of a field as a PNG heatmap with axes and labels.
/// - x/y axes are cell indices
/// - colour encodes the value (blue ≈ min, white ≈ mid, red ≈ max)
pub fn save_field_plot(
    field: &Field2D,
    caption: &str,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let nx = field.nx() as i32;
    let ny = field.ny() as i32;

    // First pass: find min/max over the interior
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for j in 0..ny {
        for i in 0..nx {
            let v = field.at(i as isize, j as isize);
            if v.is_finite() {
                if v < min_v {
                    min_v = v;
                }
                if v > max_v {
                    max_v = v;
                }
            }
        }
    }
    if !min_v.is_finite() || !max_v.is_finite() {
        min_v = -1.0;
        max_v = 1.0;
    }

    let root = BitMapBackend::new(filename, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .caption(caption, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..nx, 0..ny)?;

    chart
        .configure_mesh()
        .x_desc("x (cell index)")
        .y_desc("y (cell index)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // One coloured rectangle per interior cell
    chart.draw_series((0..nx).flat_map(|i| {
        (0..ny).map(move |j| {
            let v = field.at(i as isize, j as isize);
            let color = value_to_color(v, min_v, max_v);
            Rectangle::new([(i, j), (i + 1, j + 1)], color.filled())
        })
    }))?;

    root.present()?;
    Ok(())
}
