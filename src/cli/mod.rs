//! Command line interface for the application.
//!
//! Provides an entry point for the application and handles the CLI
//! arguments.
mod image_io;

use std::fs;
use std::path::Path;

use clap::{ArgGroup, Args, Parser, Subcommand};
use const_format::formatcp;
use thiserror::Error;

use self::image_io::{load_image, normalized_extension, write_image};
use crate::stego::{
    ChannelStride, EmbeddingPlan, MAX_REASONABLE_MSG_SIZE, StegoError,
    embed_text, extract_text, max_message_size,
};

/// Errors that can be emitted while handling the CLI
#[derive(Debug, Error)]
pub enum AppError
{
    /// Reading an input file failed
    #[error("failed to read {}: {source}", .path.display())]
    Read
    {
        /// Path that could not be read
        path: Box<Path>,
        /// Source I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing an output file failed
    #[error("failed to write {}: {source}", .path.display())]
    Write
    {
        /// Path that could not be written
        path: Box<Path>,
        /// Source I/O error
        #[source]
        source: std::io::Error,
    },

    /// Opening or decoding an input image failed
    #[error("failed to open image {}: {source}", .path.display())]
    ImageOpen
    {
        /// Path to the offending image
        path: Box<Path>,
        /// Source image error
        #[source]
        source: image::ImageError,
    },

    /// Encoding the output image failed
    #[error(
        "failed to encode {} as {target_format}: {source}",
        .path.display()
    )]
    ImageEncode
    {
        /// Destination path
        path: Box<Path>,
        /// Encoder that failed
        target_format: Box<str>,
        /// Source image error
        #[source]
        source: image::ImageError,
    },

    /// A steganography error occurred
    #[error(transparent)]
    Stego(#[from] StegoError),

    /// Input and output formats are different
    #[error(
        "input and output formats are different, both must be \
         {input_extension}"
    )]
    DifferentFormats
    {
        /// Extension detected on the input file
        input_extension: Box<str>,
        /// Extension detected on the output file
        output_extension: Box<str>,
    },

    /// The extension maps to no supported lossless encoder
    #[error(
        "unsupported image format {extension:?}; supported: png, bmp, \
         tiff, webp"
    )]
    UnsupportedFormat
    {
        /// Extension detected on the output file
        extension: Box<str>
    },

    /// The input container is lossy
    #[error(
        "{extension} input is lossy and would destroy embedded bits; \
         convert the image to PNG first"
    )]
    LossyInput
    {
        /// Extension detected on the input file
        extension: Box<str>
    },
}

/// The main CLI parser
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Hide and recover text with LSB steganography in lossless images",
    after_help = formatcp!(
        "Maximum supported payload size is {} MiB",
        MAX_REASONABLE_MSG_SIZE / (1024 * 1024)
    )
)]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

/// The main command
#[derive(Debug, Subcommand)]
enum Command
{
    Encode(EncodingArgs),
    Decode(DecodingArgs),
    Cap(CapacityArgs),
}

/// Embed a message into an image.
#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("message")
        .required(true)
        .args(["text", "text_file"])
))]
struct EncodingArgs
{
    /// Image that will receive the text.
    input: Box<Path>,
    /// Output path for the embedded image.
    output: Box<Path>,
    /// Text to embed.
    #[arg(short = 'i', long = "input", value_name = "TEXT")]
    text: Option<String>,
    /// Path to an UTF-8 text file to embed.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    text_file: Option<Box<Path>>,
    /// Embedding plan flags.
    #[command(flatten)]
    plan: PlanArgs,
}

/// Extract a message from an image.
#[derive(Debug, Args)]
struct DecodingArgs
{
    /// Image that contains the text.
    input: Box<Path>,
    /// Optional file to write the decoded text. Prints to stdout when
    /// omitted.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    output_text: Option<Box<Path>>,
    /// Embedding plan flags.
    #[command(flatten)]
    plan: PlanArgs,
}

/// Calculate the maximum possible payload size for an image.
#[derive(Debug, Args)]
struct CapacityArgs
{
    /// Image to calculate the possible payload size for.
    input: Box<Path>,
    /// Embedding plan flags.
    #[command(flatten)]
    plan: PlanArgs,
}

/// Embedding plan flags shared by all subcommands.
///
/// Both sides of a round trip must pass the same flags.
#[derive(Debug, Args, Clone)]
struct PlanArgs
{
    /// Payload bits carried in each eligible channel sample (1-8).
    #[arg(long = "bits", value_name = "DEPTH", default_value_t = 1)]
    bits_per_channel: u8,
    /// Also embed into the alpha channel.
    #[arg(long = "use-alpha")]
    use_alpha: bool,
}

impl PlanArgs
{
    fn plan(&self) -> Result<EmbeddingPlan, StegoError>
    {
        let stride = if self.use_alpha
        {
            ChannelStride::Rgba
        }
        else
        {
            ChannelStride::Rgb
        };

        EmbeddingPlan::new(self.bits_per_channel, stride)
    }
}

/// Parses CLI arguments and executes the requested operation.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files, decoding images,
/// or running steganography routines fails.
pub fn run() -> Result<(), AppError>
{
    let cli = Cli::parse();
    match cli.command
    {
        Command::Encode(mut args) => handle_encode(&mut args),
        Command::Decode(args) => handle_decode(args),
        Command::Cap(args) => handle_capacity(&args),
    }
}

/// Handles the encoding of a message into an image.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files, or encoding the
/// image.
fn handle_encode(args: &mut EncodingArgs) -> Result<(), AppError>
{
    let input_ext = normalized_extension(&args.input);
    let output_ext = normalized_extension(&args.output);

    if input_ext != output_ext
    {
        return Err(AppError::DifferentFormats {
            input_extension: input_ext
                .as_deref()
                .unwrap_or("<unknown>")
                .into(),
            output_extension: output_ext
                .as_deref()
                .unwrap_or("<unknown>")
                .into(),
        });
    }

    let plan = args.plan.plan()?;
    let mut image = load_image(&args.input)?;
    let message = resolve_message(args)?;

    // Embedding the message happens here
    embed_text(&mut image, &message, &plan)?;

    write_image(&image, input_ext.as_deref(), &args.output)
}

/// Handles the decoding of a message from an image.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files, or decoding the
/// image.
fn handle_decode(args: DecodingArgs) -> Result<(), AppError>
{
    let plan = args.plan.plan()?;
    let image = load_image(&args.input)?;
    // Extracting the message happens here
    let message = extract_text(&image, &plan)?;

    if let Some(path) = args.output_text
    {
        fs::write(&path, message.as_bytes())
            .map_err(|source| AppError::Write { path, source })?;
    }
    else
    {
        // Write the message to stdout if no file path is provided
        println!("{message}");
    }

    Ok(())
}

/// Handles the capacity calculation of a message for an image.
///
/// # Errors
///
/// Returns [`AppError`] when reading the image.
fn handle_capacity(args: &CapacityArgs) -> Result<(), AppError>
{
    let plan = args.plan.plan()?;
    let image = load_image(&args.input)?;
    let capacity = max_message_size(&image, &plan);

    println!("Maximum possible payload size: {capacity} bytes");
    if capacity > MAX_REASONABLE_MSG_SIZE
    {
        println!(
            "Warning: payload size will be capped at the maximum supported \
             size of {} MiB",
            MAX_REASONABLE_MSG_SIZE / (1024 * 1024)
        );
    }

    Ok(())
}

/// Resolves the message to embed from the command line arguments.
///
/// # Errors
///
/// Returns [`AppError`] when reading the text file fails.
fn resolve_message(args: &mut EncodingArgs) -> Result<String, AppError>
{
    match (args.text.take(), &args.text_file)
    {
        // take the ownership of the text
        (Some(text), None) => Ok(text),
        (None, Some(path)) =>
        {
            fs::read_to_string(path.as_ref()).map_err(|source| {
                AppError::Read {
                    path: path.as_ref().into(),
                    source,
                }
            })
        },
        _ => unreachable!(
            "mutually exclusive group should ensure that either text or \
             text_file is provided"
        ),
    }
}

#[cfg(test)]
mod tests
{
    use std::path::Path;

    use clap::{CommandFactory, Parser};
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn clap_configuration_is_sound()
    {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encode_with_inline_text()
    {
        let cli = Cli::try_parse_from([
            "pixelveil",
            "encode",
            "input.png",
            "output.png",
            "--input",
            "secret",
        ])
        .expect("expected encode command");

        match cli.command
        {
            Command::Encode(args) =>
            {
                assert_eq!(args.input.as_ref(), Path::new("input.png"));
                assert_eq!(args.output.as_ref(), Path::new("output.png"));
                assert_eq!(args.text.as_deref(), Some("secret"));
                assert!(args.text_file.is_none());
                assert_eq!(args.plan.bits_per_channel, 1);
                assert!(!args.plan.use_alpha);
            },
            other => panic!("expected encode command, got {other:?}"),
        }
    }

    #[test]
    fn parses_encode_with_text_file()
    {
        let cli = Cli::try_parse_from([
            "pixelveil",
            "encode",
            "input.png",
            "output.png",
            "--file",
            "message.txt",
        ])
        .expect("expected encode command");

        match cli.command
        {
            Command::Encode(args) =>
            {
                assert!(args.text.is_none());
                assert_eq!(
                    args.text_file.as_deref(),
                    Some(Path::new("message.txt"))
                );
            },
            other => panic!("expected encode command, got {other:?}"),
        }
    }

    #[test]
    fn encode_requires_message_source()
    {
        Cli::try_parse_from(["pixelveil", "encode", "input.png", "output.png"])
            .expect_err("missing message source must error");
    }

    #[test]
    fn parses_plan_flags()
    {
        let cli = Cli::try_parse_from([
            "pixelveil",
            "decode",
            "payload.png",
            "--bits",
            "2",
            "--use-alpha",
        ])
        .expect("expected decode command");

        match cli.command
        {
            Command::Decode(args) =>
            {
                assert_eq!(args.plan.bits_per_channel, 2);
                assert!(args.plan.use_alpha);

                let plan = args.plan.plan().expect("valid plan");
                assert_eq!(plan.bits_per_channel(), 2);
                assert_eq!(plan.stride(), ChannelStride::Rgba);
            },
            other => panic!("expected decode command, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_depth_is_reported()
    {
        let args = PlanArgs {
            bits_per_channel: 12,
            use_alpha: false,
        };

        let error = args.plan().expect_err("depth 12 must be rejected");
        assert!(matches!(
            error,
            StegoError::UnsupportedBitDepth { requested: 12 }
        ));
    }

    #[test]
    fn parses_decode_with_output_file()
    {
        let cli = Cli::try_parse_from([
            "pixelveil",
            "decode",
            "payload.png",
            "--output",
            "message.txt",
        ])
        .expect("expected decode command");

        match cli.command
        {
            Command::Decode(args) =>
            {
                assert_eq!(args.input.as_ref(), Path::new("payload.png"));
                assert_eq!(
                    args.output_text.as_deref(),
                    Some(Path::new("message.txt"))
                );
            },
            other => panic!("expected decode command, got {other:?}"),
        }
    }

    #[test]
    fn parses_capacity_command()
    {
        let cli = Cli::try_parse_from(["pixelveil", "cap", "image.png"])
            .expect("expected capacity command");

        match cli.command
        {
            Command::Cap(args) =>
            {
                assert_eq!(args.input.as_ref(), Path::new("image.png"));
            },
            other => panic!("expected capacity command, got {other:?}"),
        }
    }

    #[test]
    fn should_reject_different_input_formats()
    {
        let mut args = EncodingArgs {
            input: Path::new("input.png").into(),
            output: Path::new("output.bmp").into(),
            text: Some("payload".into()),
            text_file: None,
            plan: PlanArgs {
                bits_per_channel: 1,
                use_alpha: false,
            },
        };

        let error = handle_encode(&mut args)
            .expect_err("should reject different input formats");

        assert!(matches!(
            error,
            AppError::DifferentFormats {
                input_extension,
                output_extension
            } if input_extension.as_ref() == "png"
                && output_extension.as_ref() == "bmp"
        ));
    }

    #[test]
    fn resolve_message_prefers_inline_text()
    {
        let mut args = EncodingArgs {
            input: Path::new("input.png").into(),
            output: Path::new("output.png").into(),
            text: Some("payload".into()),
            text_file: None,
            plan: PlanArgs {
                bits_per_channel: 1,
                use_alpha: false,
            },
        };

        let resolved = resolve_message(&mut args).expect("should resolve text");
        assert_eq!(resolved, "payload");
    }

    #[test]
    fn resolve_message_reads_from_file()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let text_path = dir.path().join("message.txt");
        fs::write(&text_path, "from file").expect("failed to write message");

        let mut args = EncodingArgs {
            input: Path::new("input.png").into(),
            output: Path::new("output.png").into(),
            text: None,
            text_file: Some(text_path.into_boxed_path()),
            plan: PlanArgs {
                bits_per_channel: 1,
                use_alpha: false,
            },
        };

        let resolved = resolve_message(&mut args).expect("should resolve file");
        assert_eq!(resolved, "from file");
    }

    #[test]
    fn encode_then_decode_through_files()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let input = dir.path().join("carrier.png");
        let output = dir.path().join("stego.png");
        let recovered = dir.path().join("recovered.txt");

        RgbaImage::from_pixel(64, 64, Rgba([30, 60, 90, 255]))
            .save(&input)
            .expect("failed to save carrier image");

        let mut encode_args = EncodingArgs {
            input: input.into_boxed_path(),
            output: output.clone().into_boxed_path(),
            text: Some("file round trip".into()),
            text_file: None,
            plan: PlanArgs {
                bits_per_channel: 1,
                use_alpha: false,
            },
        };
        handle_encode(&mut encode_args).expect("encode failed");

        let decode_args = DecodingArgs {
            input: output.into_boxed_path(),
            output_text: Some(recovered.clone().into_boxed_path()),
            plan: PlanArgs {
                bits_per_channel: 1,
                use_alpha: false,
            },
        };
        handle_decode(decode_args).expect("decode failed");

        let text =
            fs::read_to_string(&recovered).expect("failed to read output");
        assert_eq!(text, "file round trip");
    }

    #[test]
    fn decoding_with_the_wrong_depth_fails()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let input = dir.path().join("carrier.png");
        let output = dir.path().join("stego.png");

        RgbaImage::from_pixel(64, 64, Rgba([255; 4]))
            .save(&input)
            .expect("failed to save carrier image");

        let mut encode_args = EncodingArgs {
            input: input.into_boxed_path(),
            output: output.clone().into_boxed_path(),
            text: Some("depth matters".into()),
            text_file: None,
            plan: PlanArgs {
                bits_per_channel: 1,
                use_alpha: false,
            },
        };
        handle_encode(&mut encode_args).expect("encode failed");

        let decode_args = DecodingArgs {
            input: output.into_boxed_path(),
            output_text: None,
            plan: PlanArgs {
                bits_per_channel: 4,
                use_alpha: false,
            },
        };
        handle_decode(decode_args)
            .expect_err("mismatched plan must not decode");
    }
}
