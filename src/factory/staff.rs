use chrono::{DateTime, FixedOffset, NaiveDate};
use fake::{
    faker::{
        internet::en::SafeEmail,
        name::en::Name,
        phone_number::en::PhoneNumber,
    },
    Dummy, Fake, Faker,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::staff::{Staff, TABLE_NAME};

pub struct StaffFactory<T: Clone> {
    modifier_one: fn(x: &Staff, ext: T) -> Staff,
    modifier_many: fn(x: &Staff, idx: usize, ext: T) -> Staff,
}

impl<T: Clone> Default for StaffFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> StaffFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Staff, ext: T) -> Staff) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Staff, idx: usize, ext: T) -> Staff) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Staff> {
        let data = StaffDummy::new();
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
    ) -> anyhow::Result<Vec<Staff>> {
        let data = StaffDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Staff> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert(db: &PgPool, data: &Staff) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, staff_name, phone, email, address, staff_level_id,
            join_date, is_active, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(&data.staff_name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.address)
    .bind(data.staff_level_id)
    .bind(data.join_date)
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
struct StaffDummy {
    pub id: Uuid,
    #[dummy(faker = "Name()")]
    pub staff_name: String,
    #[dummy(faker = "PhoneNumber()")]
    pub phone: String,
    #[dummy(faker = "SafeEmail()")]
    pub email: String,
    pub address: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl StaffDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Staff {
        let dummy = Faker.fake::<StaffDummy>();
        dummy.into_model()
    }

    pub fn generate_many(&self, num: u32) -> Vec<Staff> {
        let mut result: Vec<Staff> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(dummy.into_model());
        }
        result
    }

    fn into_model(self) -> Staff {
        Staff {
            id: self.id,
            staff_name: self.staff_name,
            phone: Some(self.phone),
            email: Some(self.email),
            address: self.address,
            staff_level_id: None,
            join_date: self.join_date,
            is_active: true,
            created_by: None,
            updated_by: None,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::{
        factory::{staff::StaffFactory, staff_level::StaffLevelFactory},
        model::staff::{Staff, TABLE_NAME},
    };

    #[sqlx::test]
    async fn test_generate_one_with_level(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let level = StaffLevelFactory::new().generate_one(&pool, ()).await?;

        // When
        let mut factory = StaffFactory::<Uuid>::new();
        factory.modified_one(|data, ext| Staff {
            staff_level_id: Some(ext),
            ..data.clone()
        });
        let staff = factory.generate_one(&pool, level.id).await?;

        // Expect
        let res: (Uuid, Option<Uuid>) = sqlx::query_as(
            format!(r#"SELECT id, staff_level_id FROM {}"#, TABLE_NAME).as_str(),
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(res.0, staff.id);
        assert_eq!(res.1, Some(level.id));
        Ok(())
    }
}
