use chrono::{DateTime, FixedOffset};
use fake::{
    faker::lorem::en::Word,
    Dummy, Fake, Faker,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::staff_level::{StaffLevel, TABLE_NAME};

pub struct StaffLevelFactory<T: Clone> {
    modifier_one: fn(x: &StaffLevel, ext: T) -> StaffLevel,
    modifier_many: fn(x: &StaffLevel, idx: usize, ext: T) -> StaffLevel,
}

impl<T: Clone> Default for StaffLevelFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> StaffLevelFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &StaffLevel, ext: T) -> StaffLevel) {
        self.modifier_one = modifier
    }

    pub fn modified_many(
        &mut self,
        modifier: fn(x: &StaffLevel, idx: usize, ext: T) -> StaffLevel,
    ) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<StaffLevel> {
        let data = StaffLevelDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        insert(db, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<StaffLevel>> {
        let data = StaffLevelDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<StaffLevel> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert(db: &PgPool, data: &StaffLevel) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, level_name, description, commission_rate, is_active,
            created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(&data.level_name)
    .bind(&data.description)
    .bind(data.commission_rate)
    .bind(data.is_active)
    .bind(data.created_by)
    .bind(data.updated_by)
    .bind(data.created_date)
    .bind(data.updated_date)
    .execute(db)
    .await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct StaffLevelDummy {
    pub id: Uuid,
    #[dummy(faker = "Word()")]
    pub level_name: String,
    pub description: Option<String>,
    #[dummy(faker = "0..=100")]
    pub commission_rate: i32,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl StaffLevelDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> StaffLevel {
        let dummy = Faker.fake::<StaffLevelDummy>();
        dummy.into_model()
    }

    pub fn generate_many(&self, num: u32) -> Vec<StaffLevel> {
        let mut result: Vec<StaffLevel> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(dummy.into_model());
        }
        result
    }

    fn into_model(self) -> StaffLevel {
        StaffLevel {
            id: self.id,
            level_name: self.level_name,
            description: self.description,
            commission_rate: self.commission_rate,
            is_active: true,
            created_by: None,
            updated_by: None,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}
