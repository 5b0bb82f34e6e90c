use chrono::{DateTime, FixedOffset};
use fake::{
    faker::lorem::en::Word,
    Dummy, Fake, Faker,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::menu::{Menu, TABLE_NAME};

pub struct MenuFactory<T: Clone> {
    modifier_one: fn(x: &Menu, ext: T) -> Menu,
    modifier_many: fn(x: &Menu, idx: usize, ext: T) -> Menu,
}

impl<T: Clone> Default for MenuFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MenuFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Menu, ext: T) -> Menu) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Menu, idx: usize, ext: T) -> Menu) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Menu> {
        let data = MenuDummy::new();
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
    ) -> anyhow::Result<Vec<Menu>> {
        let data = MenuDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Menu> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert(db: &PgPool, data: &Menu) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, menu_name, menu_url, icon, parent_id, sort_order,
            is_active, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(&data.menu_name)
    .bind(&data.menu_url)
    .bind(&data.icon)
    .bind(data.parent_id)
    .bind(data.sort_order)
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
struct MenuDummy {
    pub id: Uuid,
    #[dummy(faker = "Word()")]
    pub menu_name: String,
    pub icon: Option<String>,
    #[dummy(faker = "0..100")]
    pub sort_order: i32,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl MenuDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Menu {
        let dummy = Faker.fake::<MenuDummy>();
        dummy.into_model()
    }

    pub fn generate_many(&self, num: u32) -> Vec<Menu> {
        let mut result: Vec<Menu> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(dummy.into_model());
        }
        result
    }

    fn into_model(self) -> Menu {
        Menu {
            id: self.id,
            menu_name: self.menu_name,
            menu_url: format!("/{}", self.id.simple()),
            icon: self.icon,
            parent_id: None,
            sort_order: self.sort_order,
            is_active: true,
            created_by: None,
            updated_by: None,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}
