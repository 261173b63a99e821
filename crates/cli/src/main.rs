use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pim_core::checkdigit::{CheckDigitAlgorithm, LuhnAlgorithm};
use pim_core::{IdentifierTypeSet, IdentifierValidator, NoIdentifiers, StaticMessages};
use pim_meta::BoundedFieldInspector;
use pim_types::{domain_registry, Location, PatientIdentifier, DOMAIN_ROOT};

#[derive(Parser)]
#[command(name = "pim")]
#[command(about = "PIM patient identifier tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an identifier against a configured identifier type
    Validate {
        /// Identifier value to validate
        identifier: String,
        /// Name of the identifier type (as defined in the types file)
        #[arg(long = "type")]
        type_name: String,
        /// Identifier type definitions (YAML or JSON)
        #[arg(long)]
        types_file: PathBuf,
        /// Issuing location name (optional)
        #[arg(long)]
        location: Option<String>,
    },
    /// Compute the Luhn check digit for an undecorated identifier
    CheckDigit {
        /// Identifier without its check digit
        undecorated: String,
    },
    /// List the registered fields of a domain type
    Fields {
        /// Domain type name (e.g. Patient, PatientIdentifier)
        type_name: String,
        /// Only show fields bounded by this reference type (defaults to the
        /// domain root when given without a value)
        #[arg(long, num_args = 0..=1, default_missing_value = DOMAIN_ROOT)]
        bounded_to: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("pim=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            identifier,
            type_name,
            types_file,
            location,
        } => {
            let types = IdentifierTypeSet::load_from_file(&types_file)?;
            let Some(id_type) = types.get(&type_name) else {
                eprintln!("Identifier type \"{type_name}\" is not defined in the types file.");
                std::process::exit(1);
            };

            let record = PatientIdentifier::new(
                identifier,
                Some(id_type.clone()),
                location.map(Location::new),
            );

            let validator = IdentifierValidator::new(&NoIdentifiers, &StaticMessages);
            match validator.validate(&record) {
                Ok(()) => println!("{}: valid {}", record.identifier, type_name),
                Err(e) => {
                    eprintln!("{}: {e}", record.identifier);
                    std::process::exit(1);
                }
            }
        }
        Commands::CheckDigit { undecorated } => {
            let digit = LuhnAlgorithm.check_digit(&undecorated)?;
            println!("{undecorated}-{digit}");
        }
        Commands::Fields {
            type_name,
            bounded_to,
        } => {
            let registry = domain_registry()?;
            match bounded_to {
                Some(reference) => {
                    let inspector = BoundedFieldInspector::new(&registry, &reference)?;
                    for field in inspector.bounded_fields(&type_name)? {
                        println!("{}.{}: {}", field.declared_in, field.name, field.ty);
                    }
                }
                None => {
                    for field in registry.all_fields(&type_name)? {
                        println!("{}.{}: {}", field.declared_in, field.name, field.ty);
                    }
                }
            }
        }
    }

    Ok(())
}
