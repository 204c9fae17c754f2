use crate::models::{DeviceTable, SensorReadingTable, Table, UserTable};

pub struct SchemaManager {
    tables: Vec<Box<dyn Table + Send + Sync>>,
}

impl SchemaManager {
    pub fn new(tables: Vec<Box<dyn Table + Send + Sync>>) -> Self {
        Self {
            tables: Self::sort_tables(tables),
        }
    }

    /// Orders tables so every table comes after the tables it depends on.
    fn sort_tables(tables: Vec<Box<dyn Table + Send + Sync>>) -> Vec<Box<dyn Table + Send + Sync>> {
        let mut pending = tables;
        let mut sorted: Vec<Box<dyn Table + Send + Sync>> = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let (ready, blocked): (Vec<_>, Vec<_>) = pending.into_iter().partition(|table| {
                table
                    .dependencies()
                    .iter()
                    .all(|dependency| sorted.iter().any(|done| done.name() == *dependency))
            });

            assert!(
                !ready.is_empty(),
                "Circular dependency detected or unresolved dependencies exist: {:?}",
                blocked.iter().map(|table| table.name()).collect::<Vec<_>>()
            );

            sorted.extend(ready);
            pending = blocked;
        }

        sorted
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![
            Box::new(UserTable),
            Box::new(DeviceTable),
            Box::new(SensorReadingTable),
        ])
    }
}
