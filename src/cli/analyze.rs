use crate::analyzer::{self, DEFAULT_SAMPLES};
use crate::display;
use crate::math::parse_rational;

pub fn analyze_expression(expression: &str, range: f64, show_plot: bool) {
    let function = match parse_rational(expression) {
        Ok(function) => function,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let analysis = match analyzer::analyze(&function) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("Failed to analyze {}: {}", function, e);
            std::process::exit(1);
        }
    };

    display::banner("ASYMPTOTE - Function Analysis");
    display::display_analysis(&function, &analysis);

    if show_plot {
        let range = range.abs().max(1.0);
        let plot = analyzer::plot(
            &function,
            &analysis,
            (-range, range),
            (-range, range),
            DEFAULT_SAMPLES,
        );
        println!();
        display::display_plot(&plot);
    }
}
