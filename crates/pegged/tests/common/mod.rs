//! Shared fixture for the integration tests: a root record type with every
//! relation flavor, the SQLite schema backing it, and seed helpers.

#![allow(dead_code)]

use pegged::{Base, Db, Record};

use pegged_core::{
    driver::Row, impl_record_base, schema::Descriptor, stmt::Value, Result, Uuid,
};
use pegged_sqlite::Sqlite;

use std::sync::LazyLock;

pub fn db() -> Db {
    static TRACING: LazyLock<()> = LazyLock::new(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .try_init();
    });
    LazyLock::force(&TRACING);

    let driver = Sqlite::in_memory();
    let db = Db::new(driver.connect().expect("open in-memory sqlite"));
    for statement in SCHEMA {
        db.raw(*statement).expect("create schema");
    }
    db
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE top_level (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        real_name_column TEXT NOT NULL DEFAULT '',
        age INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE dog (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        name TEXT NOT NULL DEFAULT '',
        color TEXT NOT NULL DEFAULT '',
        top_level_id TEXT REFERENCES top_level (id) ON DELETE CASCADE
    )",
    "CREATE TABLE dog_toy (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        toy_name TEXT NOT NULL DEFAULT '',
        dog_id TEXT REFERENCES dog (id) ON DELETE CASCADE
    )",
    "CREATE TABLE embed_dog (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        name TEXT NOT NULL DEFAULT '',
        color TEXT NOT NULL DEFAULT '',
        top_level_id TEXT REFERENCES top_level (id) ON DELETE CASCADE
    )",
    "CREATE TABLE embed_dog_toy (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        toy_name TEXT NOT NULL DEFAULT '',
        embed_dog_id TEXT REFERENCES embed_dog (id) ON DELETE CASCADE
    )",
    "CREATE TABLE evil_dog (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        name TEXT NOT NULL DEFAULT '',
        color TEXT NOT NULL DEFAULT '',
        top_level_id TEXT REFERENCES top_level (id) ON DELETE CASCADE
    )",
    "CREATE TABLE cat (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        name TEXT NOT NULL DEFAULT '',
        color TEXT NOT NULL DEFAULT '',
        top_level_id TEXT REFERENCES top_level (id) ON DELETE SET NULL
    )",
    "CREATE TABLE evil_cat (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        name TEXT NOT NULL DEFAULT '',
        color TEXT NOT NULL DEFAULT '',
        top_level_id TEXT REFERENCES top_level (id) ON DELETE SET NULL
    )",
    "CREATE TABLE pal (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        name TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE top_level_pal (
        top_level_id TEXT NOT NULL,
        pal_id TEXT NOT NULL
    )",
    "CREATE TABLE unnested (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        name TEXT NOT NULL DEFAULT '',
        top_level_id TEXT REFERENCES top_level (id) ON DELETE CASCADE
    )",
    "CREATE TABLE unnested_inner (
        id TEXT PRIMARY KEY,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT,
        name TEXT NOT NULL DEFAULT '',
        unnested_id TEXT REFERENCES unnested (id) ON DELETE CASCADE
    )",
];

// --- the root ---

#[derive(Debug, Default)]
pub struct TopLevel {
    pub base: Base,
    pub name: String,
    pub age: i64,

    pub dogs: Vec<Dog>,
    pub cats: Vec<Cat>,
    pub embed_dog: EmbedDog,
    pub evil_dog: Option<EvilDog>,
    pub evil_cat: Option<EvilCat>,
    pub pals: Vec<Pal>,
}

impl Record for TopLevel {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("TopLevel")
                .field_as("name", "real_name_column")
                .field("age")
                .many::<TopLevel, Dog>(
                    "dogs",
                    "peg",
                    |r| &r.dogs,
                    |r| &mut r.dogs,
                    |c| c.top_level_id,
                    |c, id| c.top_level_id = id,
                )
                .many::<TopLevel, Cat>(
                    "cats",
                    "pegassoc",
                    |r| &r.cats,
                    |r| &mut r.cats,
                    |c| c.top_level_id,
                    |c, id| c.top_level_id = id,
                )
                .one::<TopLevel, EmbedDog>(
                    "embed_dog",
                    "peg",
                    |r| &r.embed_dog,
                    |r| &mut r.embed_dog,
                    |c| c.top_level_id,
                    |c, id| c.top_level_id = id,
                )
                .opt::<TopLevel, EvilDog>(
                    "evil_dog",
                    "peg",
                    |r| &r.evil_dog,
                    |r| &mut r.evil_dog,
                    |c| c.top_level_id,
                    |c, id| c.top_level_id = id,
                )
                .opt::<TopLevel, EvilCat>(
                    "evil_cat",
                    "pegassoc",
                    |r| &r.evil_cat,
                    |r| &mut r.evil_cat,
                    |c| c.top_level_id,
                    |c, id| c.top_level_id = id,
                )
                .many_linked::<TopLevel, Pal>(
                    "pals",
                    "pegassoc-many2many:top_level_pal",
                    |r| &r.pals,
                    |r| &mut r.pals,
                )
                .build::<TopLevel>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("real_name_column", self.name.clone().into()));
        row.push(("age", self.age.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("real_name_column")?.to_text()?;
        self.age = row.get("age")?.to_i64()?;
        Ok(())
    }
}

// --- pegged nesting, two levels ---

#[derive(Debug, Default)]
pub struct Dog {
    pub base: Base,
    pub name: String,
    pub color: String,
    pub dog_toys: Vec<DogToy>,
    pub top_level_id: Option<Uuid>,
}

impl Record for Dog {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("Dog")
                .field("name")
                .field("color")
                .field("top_level_id")
                .many::<Dog, DogToy>(
                    "dog_toys",
                    "peg",
                    |r| &r.dog_toys,
                    |r| &mut r.dog_toys,
                    |c| c.dog_id,
                    |c, id| c.dog_id = id,
                )
                .build::<Dog>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("name", self.name.clone().into()));
        row.push(("color", self.color.clone().into()));
        row.push(("top_level_id", self.top_level_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("name")?.to_text()?;
        self.color = row.get("color")?.to_text()?;
        self.top_level_id = row.get("top_level_id")?.to_uuid_opt()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DogToy {
    pub base: Base,
    pub toy_name: String,
    pub dog_id: Option<Uuid>,
}

impl Record for DogToy {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("DogToy")
                .field("toy_name")
                .field("dog_id")
                .build::<DogToy>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("toy_name", self.toy_name.clone().into()));
        row.push(("dog_id", self.dog_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.toy_name = row.get("toy_name")?.to_text()?;
        self.dog_id = row.get("dog_id")?.to_uuid_opt()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EmbedDog {
    pub base: Base,
    pub name: String,
    pub color: String,
    pub dog_toys: Vec<EmbedDogToy>,
    pub top_level_id: Option<Uuid>,
}

impl Record for EmbedDog {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("EmbedDog")
                .field("name")
                .field("color")
                .field("top_level_id")
                .many::<EmbedDog, EmbedDogToy>(
                    "dog_toys",
                    "peg",
                    |r| &r.dog_toys,
                    |r| &mut r.dog_toys,
                    |c| c.embed_dog_id,
                    |c, id| c.embed_dog_id = id,
                )
                .build::<EmbedDog>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("name", self.name.clone().into()));
        row.push(("color", self.color.clone().into()));
        row.push(("top_level_id", self.top_level_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("name")?.to_text()?;
        self.color = row.get("color")?.to_text()?;
        self.top_level_id = row.get("top_level_id")?.to_uuid_opt()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EmbedDogToy {
    pub base: Base,
    pub toy_name: String,
    pub embed_dog_id: Option<Uuid>,
}

impl Record for EmbedDogToy {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("EmbedDogToy")
                .field("toy_name")
                .field("embed_dog_id")
                .build::<EmbedDogToy>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("toy_name", self.toy_name.clone().into()));
        row.push(("embed_dog_id", self.embed_dog_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.toy_name = row.get("toy_name")?.to_text()?;
        self.embed_dog_id = row.get("embed_dog_id")?.to_uuid_opt()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EvilDog {
    pub base: Base,
    pub name: String,
    pub color: String,
    pub top_level_id: Option<Uuid>,
}

impl Record for EvilDog {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("EvilDog")
                .field("name")
                .field("color")
                .field("top_level_id")
                .build::<EvilDog>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("name", self.name.clone().into()));
        row.push(("color", self.color.clone().into()));
        row.push(("top_level_id", self.top_level_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("name")?.to_text()?;
        self.color = row.get("color")?.to_text()?;
        self.top_level_id = row.get("top_level_id")?.to_uuid_opt()?;
        Ok(())
    }
}

// --- peg-associated records: only the back-pointer is ever written ---

#[derive(Debug, Default, Clone)]
pub struct Cat {
    pub base: Base,
    pub name: String,
    pub color: String,
    pub top_level_id: Option<Uuid>,
}

impl Record for Cat {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("Cat")
                .field("name")
                .field("color")
                .field("top_level_id")
                .build::<Cat>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("name", self.name.clone().into()));
        row.push(("color", self.color.clone().into()));
        row.push(("top_level_id", self.top_level_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("name")?.to_text()?;
        self.color = row.get("color")?.to_text()?;
        self.top_level_id = row.get("top_level_id")?.to_uuid_opt()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EvilCat {
    pub base: Base,
    pub name: String,
    pub color: String,
    pub top_level_id: Option<Uuid>,
}

impl Record for EvilCat {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("EvilCat")
                .field("name")
                .field("color")
                .field("top_level_id")
                .build::<EvilCat>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("name", self.name.clone().into()));
        row.push(("color", self.color.clone().into()));
        row.push(("top_level_id", self.top_level_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("name")?.to_text()?;
        self.color = row.get("color")?.to_text()?;
        self.top_level_id = row.get("top_level_id")?.to_uuid_opt()?;
        Ok(())
    }
}

// --- many-to-many through top_level_pal ---

#[derive(Debug, Default)]
pub struct Pal {
    pub base: Base,
    pub name: String,
}

impl Record for Pal {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("Pal").field("name").build::<Pal>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("name", self.name.clone().into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("name")?.to_text()?;
        Ok(())
    }
}

// --- a separate table that joins back to the root ---

#[derive(Debug, Default)]
pub struct Unnested {
    pub base: Base,
    pub name: String,
    pub unnested_inner: UnnestedInner,
    pub top_level_id: Option<Uuid>,
}

impl Record for Unnested {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("Unnested")
                .field("name")
                .field("top_level_id")
                .one::<Unnested, UnnestedInner>(
                    "unnested_inner",
                    "peg",
                    |r| &r.unnested_inner,
                    |r| &mut r.unnested_inner,
                    |c| c.unnested_id,
                    |c, id| c.unnested_id = id,
                )
                .build::<Unnested>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("name", self.name.clone().into()));
        row.push(("top_level_id", self.top_level_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("name")?.to_text()?;
        self.top_level_id = row.get("top_level_id")?.to_uuid_opt()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct UnnestedInner {
    pub base: Base,
    pub name: String,
    pub unnested_id: Option<Uuid>,
}

impl Record for UnnestedInner {
    fn descriptor() -> &'static Descriptor {
        static DESC: LazyLock<Descriptor> = LazyLock::new(|| {
            Descriptor::builder("UnnestedInner")
                .field("name")
                .field("unnested_id")
                .build::<UnnestedInner>()
        });
        &DESC
    }

    impl_record_base!();

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        let mut row = self.base.row();
        row.push(("name", self.name.clone().into()));
        row.push(("unnested_id", self.unnested_id.into()));
        row
    }

    fn load_row(&mut self, row: &Row) -> Result<()> {
        self.base.load(row)?;
        self.name = row.get("name")?.to_text()?;
        self.unnested_id = row.get("unnested_id")?.to_uuid_opt()?;
        Ok(())
    }
}

// --- seed helpers ---

pub fn top_level(name: &str, age: i64) -> TopLevel {
    TopLevel {
        base: Base::with_id(Uuid::new_v4()),
        name: name.to_owned(),
        age,
        ..TopLevel::default()
    }
}

pub fn dog(name: &str, color: &str) -> Dog {
    Dog {
        base: Base::with_id(Uuid::new_v4()),
        name: name.to_owned(),
        color: color.to_owned(),
        ..Dog::default()
    }
}

pub fn dog_toy(toy_name: &str) -> DogToy {
    DogToy {
        base: Base::with_id(Uuid::new_v4()),
        toy_name: toy_name.to_owned(),
        ..DogToy::default()
    }
}

pub fn embed_dog(name: &str, color: &str) -> EmbedDog {
    EmbedDog {
        base: Base::with_id(Uuid::new_v4()),
        name: name.to_owned(),
        color: color.to_owned(),
        ..EmbedDog::default()
    }
}

pub fn embed_dog_toy(toy_name: &str) -> EmbedDogToy {
    EmbedDogToy {
        base: Base::with_id(Uuid::new_v4()),
        toy_name: toy_name.to_owned(),
        ..EmbedDogToy::default()
    }
}

pub fn cat(name: &str, color: &str) -> Cat {
    Cat {
        base: Base::with_id(Uuid::new_v4()),
        name: name.to_owned(),
        color: color.to_owned(),
        ..Cat::default()
    }
}

pub fn pal(name: &str) -> Pal {
    Pal {
        base: Base::with_id(Uuid::new_v4()),
        name: name.to_owned(),
        ..Pal::default()
    }
}

/// Inserts a link-table row by hand; the layer never creates links itself.
pub fn link_pal(db: &Db, top_level_id: Uuid, pal_id: Uuid) {
    db.raw(format!(
        "INSERT INTO top_level_pal (top_level_id, pal_id) VALUES ('{top_level_id}', '{pal_id}')"
    ))
    .expect("insert link row");
}

/// Counts the rows of a table with a raw statement, outside the layer.
pub fn raw_count(db: &Db, table: &str, where_clause: &str) -> i64 {
    let sql = if where_clause.is_empty() {
        format!("SELECT COUNT(*) AS n FROM {table}")
    } else {
        format!("SELECT COUNT(*) AS n FROM {table} WHERE {where_clause}")
    };
    let rows = db.raw_rows(&sql).expect("raw count");
    rows[0].get("n").expect("count column").to_i64().expect("count value")
}
