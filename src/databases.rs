/// One entry of the database menu: a label for humans and the type
/// identifier the API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseChoice {
    pub name: &'static str,
    pub value: &'static str,
}

pub const DATABASES: &[DatabaseChoice] = &[
    DatabaseChoice { name: "MongoDB", value: "mongodb" },
    DatabaseChoice { name: "PostgreSQL", value: "postgresql" },
    DatabaseChoice { name: "Redis", value: "redis" },
    DatabaseChoice { name: "Elasticsearch", value: "elastic_search" },
    DatabaseChoice { name: "RethinkDB", value: "rethink" },
    DatabaseChoice { name: "RabbitMQ", value: "rabbitmq" },
    DatabaseChoice { name: "etcd", value: "etcd" },
    DatabaseChoice { name: "ScyllaDB", value: "scylla" },
    DatabaseChoice { name: "MySQL", value: "mysql" },
    DatabaseChoice { name: "JanusGraph", value: "janusgraph" },
];

/// Find a choice by its API type identifier.
pub fn by_value(value: &str) -> Option<&'static DatabaseChoice> {
    DATABASES.iter().find(|db| db.value == value)
}
