use chrono::{DateTime, FixedOffset};
use fake::{
    faker::lorem::en::Word,
    Dummy, Fake, Faker,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::product::{Product, TABLE_NAME};

pub struct ProductFactory<T: Clone> {
    modifier_one: fn(x: &Product, ext: T) -> Product,
    modifier_many: fn(x: &Product, idx: usize, ext: T) -> Product,
}

impl<T: Clone> Default for ProductFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ProductFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Product, ext: T) -> Product) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Product, idx: usize, ext: T) -> Product) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Product> {
        let data = ProductDummy::new();
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
    ) -> anyhow::Result<Vec<Product>> {
        let data = ProductDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Product> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert(db: &PgPool, data: &Product) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, product_name, description, category, price, stock,
            is_active, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(&data.product_name)
    .bind(&data.description)
    .bind(&data.category)
    .bind(data.price)
    .bind(data.stock)
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
struct ProductDummy {
    pub id: Uuid,
    #[dummy(faker = "Word()")]
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[dummy(faker = "1000..500000")]
    pub price: i64,
    #[dummy(faker = "0..100")]
    pub stock: i32,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl ProductDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Product {
        let dummy = Faker.fake::<ProductDummy>();
        dummy.into_model()
    }

    pub fn generate_many(&self, num: u32) -> Vec<Product> {
        let mut result: Vec<Product> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(dummy.into_model());
        }
        result
    }

    fn into_model(self) -> Product {
        Product {
            id: self.id,
            product_name: self.product_name,
            description: self.description,
            category: self.category,
            price: self.price,
            stock: self.stock,
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

    use crate::{factory::product::ProductFactory, model::product::TABLE_NAME};

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = ProductFactory::new();
        let products = factory.generate_many(&pool, 5, ()).await?;

        // Expect
        let res: Vec<(i64, i32)> =
            sqlx::query_as(format!(r#"SELECT price, stock FROM {}"#, TABLE_NAME).as_str())
                .fetch_all(&pool)
                .await?;
        assert_eq!(res.len(), 5);
        assert_eq!(products.len(), 5);
        for (price, stock) in res {
            assert!(price > 0);
            assert!(stock >= 0);
        }
        Ok(())
    }
}
