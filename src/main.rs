use anyhow::Result;
use img2svg::cli;
use img2svg::convert;

fn main() -> Result<()> {
    let parsed = cli::parse_args(std::env::args())?;

    println!(
        "Converting {} to {}...",
        parsed.input.display(),
        parsed.output.display()
    );

    convert(&parsed.input, &parsed.output, &parsed.config)?;

    if parsed.show_interactive {
        println!("(interactive view is not available in this build)");
    }

    println!("Conversion complete!");
    Ok(())
}
