mod cli;

use clap::Parser;

use cli::Cli;
use inpaint::acceptance::{AcceptanceVisitor, AverageDifference, Composite, VarianceDifference};
use inpaint::debug::{write_history, DebugWriter};
use inpaint::engine::StepOutcome;
use inpaint::{raster_io, Engine};

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}

fn build_acceptance(cli: &Cli) -> Box<dyn AcceptanceVisitor> {
    let mut children: Vec<Box<dyn AcceptanceVisitor>> = Vec::new();
    if let Some(threshold) = cli.acceptance_average_threshold {
        children.push(Box::new(AverageDifference { threshold }));
    }
    if let Some(threshold) = cli.acceptance_variance_threshold {
        children.push(Box::new(VarianceDifference { threshold }));
    }
    Box::new(Composite { children })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    println!("Inpainting {} using mask {}...", cli.image.display(), cli.mask.display());

    let image = raster_io::read_image(&cli.image)?;
    let mask = raster_io::read_mask(&cli.mask)?;

    let mut engine = Engine::new(image, mask, cli.patch_half_width)?;
    engine.set_difference(inpaint::DifferenceKind::from(cli.difference).build());
    engine.set_acceptance(build_acceptance(&cli));
    engine.set_max_forward_look(cli.max_forward_look);
    engine.set_top_patches(cli.top_patches);
    engine.set_recompute_isophotes_every_n_steps(cli.recompute_isophotes_every_n_steps);

    let debug_writer = DebugWriter::new(&cli.debug_dir, cli.debug);

    loop {
        match engine.step()? {
            StepOutcome::Filled(pair) => {
                debug_writer.write_iteration(engine.iteration(), engine.image(), engine.mask(), pair.source, pair.target)?;
            }
            StepOutcome::Finished => break,
        }
    }

    raster_io::write_image(&cli.output, engine.image())?;

    if let Some(history_path) = &cli.history_json {
        write_history(engine.history(), history_path)?;
    }

    println!("Inpainting complete: {} iterations, wrote {}", engine.iteration(), cli.output.display());
    Ok(())
}
