use crate::genetic_optimizer::FitnessPoint;
use csv::Writer;
use plotters::prelude::*;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn write_history_csv<W: Write>(history: &[FitnessPoint], writer: W) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(writer);
    for point in history {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

/// Draws the best fitness of every generation as a line chart. Generations
/// are numbered from 1 on the x axis.
pub fn visualize_history(history: &[FitnessPoint], output_path: &Path) -> Result<(), Box<dyn Error>> {
    if history.is_empty() {
        return Err("no generations to plot".into());
    }

    // Create a drawing area for the chart.
    let root = BitMapBackend::new(output_path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let generations = history.len();
    let min_best = history.iter().map(|p| p.best).min().unwrap_or(0);
    let max_best = history.iter().map(|p| p.best).max().unwrap_or(0);
    // Keep a visible band even when every generation scored the same.
    let y_range = (min_best - 10)..(max_best + 10);

    let mut chart = ChartBuilder::on(&root)
        .caption("Best fitness per generation", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(1..generations + 1, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Generation")
        .y_desc("Fitness")
        .x_labels(10)
        .draw()?;

    let points = history
        .iter()
        .map(|p| (p.generation + 1, p.best));

    chart
        .draw_series(LineSeries::new(points.clone(), &BLUE))?
        .label("Best fitness")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart.draw_series(points.map(|point| Circle::new(point, 3, BLUE.filled())))?;

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    // Save the result to the specified output path.
    root.present()?;
    info!(path = %output_path.display(), "Fitness chart saved");
    Ok(())
}
