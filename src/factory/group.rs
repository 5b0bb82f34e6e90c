use chrono::{DateTime, FixedOffset};
use fake::{
    faker::lorem::en::Word,
    Dummy, Fake, Faker,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::group::{Group, TABLE_NAME};

pub struct GroupFactory<T: Clone> {
    modifier_one: fn(x: &Group, ext: T) -> Group,
    modifier_many: fn(x: &Group, idx: usize, ext: T) -> Group,
}

impl<T: Clone> Default for GroupFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> GroupFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Group, ext: T) -> Group) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Group, idx: usize, ext: T) -> Group) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Group> {
        let data = GroupDummy::new();
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
    ) -> anyhow::Result<Vec<Group>> {
        let data = GroupDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Group> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert(db: &PgPool, data: &Group) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, group_name, description, is_active, created_by, updated_by,
            created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(&data.group_name)
    .bind(&data.description)
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
struct GroupDummy {
    pub id: Uuid,
    #[dummy(faker = "Word()")]
    pub group_name: String,
    pub description: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl GroupDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Group {
        let dummy = Faker.fake::<GroupDummy>();
        dummy.into_model()
    }

    pub fn generate_many(&self, num: u32) -> Vec<Group> {
        let mut result: Vec<Group> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(dummy.into_model());
        }
        result
    }

    fn into_model(self) -> Group {
        Group {
            id: self.id,
            group_name: self.group_name,
            description: self.description,
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

    use crate::{
        factory::group::GroupFactory,
        model::group::{Group, TABLE_NAME},
    };

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = GroupFactory::new();
        factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) =
            sqlx::query_as(format!(r#"SELECT COUNT(*) FROM {}"#, TABLE_NAME).as_str())
                .fetch_one(&pool)
                .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = GroupFactory::<()>::new();
        factory.modified_many(|data, idx, _| Group {
            is_active: idx % 2 == 0,
            ..data.clone()
        });
        factory.generate_many(&pool, 6, ()).await?;

        // Expect
        let res: Vec<(bool,)> = sqlx::query_as(
            format!(r#"SELECT is_active FROM {} WHERE is_active = true"#, TABLE_NAME).as_str(),
        )
        .fetch_all(&pool)
        .await?;
        assert_eq!(res.len(), 3);
        Ok(())
    }
}
