use serde::{Deserialize, Serialize};
use tagwalk::reflect::{self, Annotated, Shape, StructSchema};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct Person {
    birth_year: i64,
    name: Name,
    email: String,
    friends: Vec<Person>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Name {
    first_name: String,
    last_name: String,
}

impl Annotated for Person {
    fn schema() -> StructSchema {
        StructSchema::new("Person")
            .tagged("birth_year", Shape::I64, r#"validate:"^(19|20)\\d\\d$""#)
            .field("name", Shape::of::<Name>())
            .tagged(
                "email",
                Shape::Str,
                r#"validate:"^[\\w.-]+@[\\w-]+\\.[a-z]{2,4}$""#,
            )
            .field("friends", Shape::seq(Shape::of::<Person>()))
    }
}

impl Annotated for Name {
    fn schema() -> StructSchema {
        StructSchema::new("Name")
            .field("first_name", Shape::Str)
            .field("last_name", Shape::Str)
    }
}

fn main() -> Result<(), tagwalk::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let person = Person {
        birth_year: 1990,
        name: Name {
            first_name: "Lasse Martin".into(),
            last_name: "Jakobsen".into(),
        },
        email: "lasse@tengen.dk".into(),
        friends: vec![Person {
            birth_year: 1992,
            name: Name {
                first_name: "Iaf".into(),
                last_name: "Nofrens".into(),
            },
            email: "l33tboi95@hotmail.com".into(),
            friends: Vec::new(),
        }],
    };

    reflect::validate(&person)?;
    println!("{} {} is valid", person.name.first_name, person.name.last_name);

    Ok(())
}
