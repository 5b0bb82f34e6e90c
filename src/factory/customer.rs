use chrono::{DateTime, FixedOffset};
use fake::{
    faker::{
        name::en::Name,
        phone_number::en::PhoneNumber,
    },
    Dummy, Fake, Faker,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::customer::{Customer, TABLE_NAME};

pub struct CustomerFactory<T: Clone> {
    modifier_one: fn(x: &Customer, ext: T) -> Customer,
    modifier_many: fn(x: &Customer, idx: usize, ext: T) -> Customer,
}

impl<T: Clone> Default for CustomerFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> CustomerFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Customer, ext: T) -> Customer) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Customer, idx: usize, ext: T) -> Customer) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Customer> {
        let data = CustomerDummy::new();
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
    ) -> anyhow::Result<Vec<Customer>> {
        let data = CustomerDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Customer> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert(db: &PgPool, data: &Customer) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, customer_name, phone, email, notes, is_active, created_by,
            updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(&data.customer_name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.notes)
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
struct CustomerDummy {
    pub id: Uuid,
    #[dummy(faker = "Name()")]
    pub customer_name: String,
    #[dummy(faker = "PhoneNumber()")]
    pub phone: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl CustomerDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Customer {
        let dummy = Faker.fake::<CustomerDummy>();
        dummy.into_model()
    }

    pub fn generate_many(&self, num: u32) -> Vec<Customer> {
        let mut result: Vec<Customer> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(dummy.into_model());
        }
        result
    }

    fn into_model(self) -> Customer {
        Customer {
            id: self.id,
            customer_name: self.customer_name,
            phone: Some(self.phone),
            email: self.email,
            notes: self.notes,
            is_active: true,
            created_by: None,
            updated_by: None,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}
