// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Headless front end.  Renders the starting viewport, then replays a
//! scripted session one action at a time, rendering a fresh frame after
//! each, the way the interactive explorer does.  The last frame is
//! written out as an image.

extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate image;
#[macro_use]
extern crate log;
extern crate num_cpus;
extern crate tilebrot;

use clap::{App, Arg, ArgMatches};
use std::fmt::Display;
use std::str::FromStr;
use tilebrot::{Action, RenderMode, Renderer, Viewport};

/// Splits `text` at the first `separator` and parses both halves, as
/// in `640x480` or `-2.0,1.0`.
fn split_parse<T: FromStr>(text: &str, separator: char) -> Option<(T, T)> {
    let mut halves = text.splitn(2, separator);
    let first = halves.next()?.trim().parse().ok()?;
    let second = halves.next()?.trim().parse().ok()?;
    Some((first, second))
}

fn check_split<T: FromStr>(text: &str, separator: char, what: &str) -> Result<(), String> {
    split_parse::<T>(text, separator)
        .map(|_| ())
        .ok_or_else(|| format!("Could not parse {} from {:?}", what, text))
}

fn check_at_least<T: FromStr + PartialOrd + Display>(
    text: &str,
    min: T,
    what: &str,
) -> Result<(), String> {
    match text.parse::<T>() {
        Ok(n) if n >= min => Ok(()),
        Ok(_) => Err(format!("{} must be at least {}", what, min)),
        Err(_) => Err(format!("Could not parse {} from {:?}", what, text)),
    }
}

fn split_arg<T: FromStr>(
    matches: &ArgMatches,
    name: &str,
    separator: char,
) -> Result<(T, T), failure::Error> {
    let text = matches.value_of(name).unwrap_or_default();
    split_parse(text, separator)
        .ok_or_else(|| failure::err_msg(format!("Error parsing {}: {:?}", name, text)))
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const HRANGE: &str = "hrange";
const VRANGE: &str = "vrange";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const MODE: &str = "mode";
const ACTION: &str = "action";

fn args<'a>() -> ArgMatches<'a> {
    App::new("tilebrot")
        .version("0.1.0")
        .about("Mandelbrot explorer with a tiled worker pool")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Image file for the final frame"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("500x500")
                .validator(|s| check_split::<u16>(&s, 'x', "frame size"))
                .help("Size of the frame in pixels"),
        )
        .arg(
            Arg::with_name(HRANGE)
                .required(false)
                .long(HRANGE)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.5,1.5")
                .validator(|s| check_split::<f64>(&s, ',', "horizontal range"))
                .help("Left and right edges on the real axis"),
        )
        .arg(
            Arg::with_name(VRANGE)
                .required(false)
                .long(VRANGE)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.5,1.5")
                .validator(|s| check_split::<f64>(&s, ',', "vertical range"))
                .help("Top and bottom edges on the imaginary axis"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("64")
                .validator(|s| check_at_least(&s, 1u32, "iteration count"))
                .help("Starting iteration budget"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(|s| check_at_least(&s, 1usize, "thread count"))
                .help("Number of tile workers (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(MODE)
                .required(false)
                .long(MODE)
                .short("m")
                .takes_value(true)
                .possible_values(&["single", "parallel"])
                .default_value("parallel")
                .help("Render on one thread or across the worker pool"),
        )
        .arg(
            Arg::with_name(ACTION)
                .required(false)
                .long(ACTION)
                .short("a")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .validator(|s| {
                    s.parse::<Action>()
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .help("Interaction to apply before re-rendering; may be repeated"),
        )
        .get_matches()
}

fn write_image(outfile: &str, rgba: Vec<u8>, bounds: (usize, usize)) -> Result<(), failure::Error> {
    let image = image::RgbaImage::from_raw(bounds.0 as u32, bounds.1 as u32, rgba)
        .ok_or_else(|| failure::err_msg("frame does not match its dimensions"))?;
    image.save(outfile)?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let (width, height) = split_arg::<usize>(matches, SIZE, 'x')?;
    let (hmin, hmax) = split_arg::<f64>(matches, HRANGE, ',')?;
    let (vmin, vmax) = split_arg::<f64>(matches, VRANGE, ',')?;
    let iterations = u32::from_str(matches.value_of(ITERATIONS).unwrap_or("64"))?;
    let threads = match matches.value_of(THREADS) {
        Some(t) => usize::from_str(t)?,
        None => num_cpus::get().min(height.max(1)),
    };
    let mode = matches
        .value_of(MODE)
        .unwrap_or("parallel")
        .parse::<RenderMode>()
        .map_err(failure::err_msg)?;
    let actions = match matches.values_of(ACTION) {
        Some(values) => values
            .map(|a| a.parse::<Action>())
            .collect::<Result<Vec<Action>, _>>()?,
        None => vec![],
    };

    let mut viewport = Viewport::new(hmin, hmax, vmin, vmax, iterations)?;
    let mut renderer = Renderer::new(width, height, threads)?;
    info!(
        "{}x{} frames, {} mode, {} workers",
        width,
        height,
        mode,
        renderer.pool().worker_count()
    );

    let (mut frame, report) = renderer.render_timed(&viewport, mode)?;
    info!("{}", report);
    for action in actions {
        viewport = action.apply(&viewport)?;
        let (next, report) = renderer.render_timed(&viewport, mode)?;
        info!("{:?}: {}", action, report);
        frame = next;
    }
    renderer.shutdown();

    let outfile = matches.value_of(OUTPUT).unwrap_or("tilebrot.png");
    write_image(outfile, frame.to_rgba(), (width, height))?;
    info!("wrote {}", outfile);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
