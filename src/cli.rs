use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Print computed names, filter graphs and skip reasons
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert mp3/wav files to mono 44.1 kHz wav or mp3
    ///
    /// Only the audio stream is kept, so album art is dropped. Output files
    /// keep the input name with the new extension.
    Convert {
        /// Output format [wav|mp3]
        #[arg(short, long, default_value = "wav")]
        format: String,

        /// Output directory. Defaults to the directory of each input.
        #[arg(short, long = "outputDirectory", visible_alias = "output-directory")]
        output_directory: Option<PathBuf>,

        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Concatenate a video with itself to create an mp4 loop
    ///
    /// -c and -l are mutually exclusive. -c has precedence over -l.
    Loop {
        /// Number of times to concatenate the video. Minimum 2.
        #[arg(short, long)]
        count: Option<u32>,

        /// Minimum length of the output in seconds
        #[arg(short, long)]
        length: Option<u64>,

        /// Concatenate with a cross-fade transition. Audio is dropped.
        #[arg(short = 'x', long = "withCrossFade", visible_alias = "with-cross-fade")]
        with_cross_fade: bool,

        /// Transition duration in seconds
        #[arg(short, long = "transitionDuration", visible_alias = "transition-duration")]
        transition_duration: Option<u64>,

        /// Output directory. Defaults to the directory of each input.
        #[arg(short, long = "outputDirectory", visible_alias = "output-directory")]
        output_directory: Option<PathBuf>,

        /// Videos to loop
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Take a single-frame snapshot of a video
    Snapshot {
        /// Take the snapshot from the middle of the video instead of the 2nd second
        #[arg(short, long)]
        mid: bool,

        /// Output format [png|jpg]
        #[arg(short, long, default_value = "png")]
        format: String,

        /// Output directory. Defaults to the directory of each input.
        #[arg(short, long = "outputDirectory", visible_alias = "output-directory")]
        output_directory: Option<PathBuf>,

        /// Videos to snapshot
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Rename files to their modification time, e.g. "2016-11-04 130738.mp3"
    Rename {
        /// Files to rename
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_loop_flags() {
        let args = Args::try_parse_from([
            "mediaprep", "-v", "loop", "-c", "3", "-l", "120", "-x", "-t", "4",
            "--outputDirectory", "out", "a.mp4", "b.mp4",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Commands::Loop { count, length, with_cross_fade, transition_duration, output_directory, files } => {
                assert_eq!(count, Some(3));
                assert_eq!(length, Some(120));
                assert!(with_cross_fade);
                assert_eq!(transition_duration, Some(4));
                assert_eq!(output_directory, Some(PathBuf::from("out")));
                assert_eq!(files.len(), 2);
            }
            _ => panic!("expected loop"),
        }
    }

    #[test]
    fn test_convert_defaults_to_wav() {
        let args = Args::try_parse_from(["mediaprep", "convert", "a.mp3"]).unwrap();
        match args.command {
            Commands::Convert { format, output_directory, .. } => {
                assert_eq!(format, "wav");
                assert!(output_directory.is_none());
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_files_are_required() {
        assert!(Args::try_parse_from(["mediaprep", "rename"]).is_err());
    }
}
