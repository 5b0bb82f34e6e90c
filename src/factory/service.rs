use chrono::{DateTime, FixedOffset};
use fake::{
    faker::lorem::en::Word,
    Dummy, Fake, Faker,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::service::{Service, TABLE_NAME};

pub struct ServiceFactory<T: Clone> {
    modifier_one: fn(x: &Service, ext: T) -> Service,
    modifier_many: fn(x: &Service, idx: usize, ext: T) -> Service,
}

impl<T: Clone> Default for ServiceFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ServiceFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Service, ext: T) -> Service) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Service, idx: usize, ext: T) -> Service) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Service> {
        let data = ServiceDummy::new();
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
    ) -> anyhow::Result<Vec<Service>> {
        let data = ServiceDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Service> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert(db: &PgPool, data: &Service) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, service_name, description, price, duration_minutes,
            is_active, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(&data.service_name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.duration_minutes)
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
struct ServiceDummy {
    pub id: Uuid,
    #[dummy(faker = "Word()")]
    pub service_name: String,
    pub description: Option<String>,
    #[dummy(faker = "1000..500000")]
    pub price: i64,
    #[dummy(faker = "15..120")]
    pub duration_minutes: i32,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl ServiceDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Service {
        let dummy = Faker.fake::<ServiceDummy>();
        dummy.into_model()
    }

    pub fn generate_many(&self, num: u32) -> Vec<Service> {
        let mut result: Vec<Service> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(dummy.into_model());
        }
        result
    }

    fn into_model(self) -> Service {
        Service {
            id: self.id,
            service_name: self.service_name,
            description: self.description,
            price: self.price,
            duration_minutes: self.duration_minutes,
            is_active: true,
            created_by: None,
            updated_by: None,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}
