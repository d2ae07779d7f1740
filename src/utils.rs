use log::LevelFilter;

use crate::regions::BoundingBox;

/// Map `-v` occurrences to a level, info by default.
pub fn level_for_verbosity(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install `env_logger` once. `RUST_LOG`, when set, wins over `verbosity`.
pub fn init_logger(verbosity: u64) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_for_verbosity(verbosity));
    builder.parse_env("RUST_LOG");
    // a second init (tests, embedding) keeps the first logger
    let _ = builder.try_init();
}

/// `x,y widthxheight`
pub fn format_box(bbox: &BoundingBox) -> String {
    format!("{},{} {}x{}", bbox.x, bbox.y, bbox.width, bbox.height)
}


#[cfg(test)]
mod test {

    use log::LevelFilter;

    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Info);
        assert_eq!(level_for_verbosity(1), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(5), LevelFilter::Trace);
    }

    #[test]
    fn formats_box() {
        assert_eq!(format_box(&BoundingBox { x: 50, y: 10, width: 100, height: 40 }), "50,10 100x40");
    }
}
