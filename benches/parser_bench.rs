use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use framelint::{check_source, CancelToken, Options};

const SOURCE: &str = r#"
import pandas as pd
import polars as pl


class UserSchema(BaseSchema):
    user_id = Column(type=int)
    email = Column(type=str)
    scores = ColumnSet(members="score_\\d+", type=float, regex=True)


class OrderSchema(BaseSchema):
    order_id = Column(type=int)
    user_id = Column(type=int)
    total = Column(type=float)


def load_users() -> DataFrame[UserSchema]:
    ...


users = load_users()
orders = pd.read_csv("orders.csv", usecols=["order_id", "user_id", "total"])

users["email"]
users["score_3"]
trimmed = users.drop(columns=["email"])
renamed = orders.rename(columns={"total": "amount"})
renamed["amount"]
merged = pd.merge(users, orders, on="user_id")
merged["total"]
picked = merged[["user_id", "total"]]
filtered = picked.filter(pl.col("total") > 10)
summary = filtered.groupby("user_id").agg(total=("total", "sum"))
summary["anything"]
"#;

fn bench_check_source(c: &mut Criterion) {
    let options = Options::default();
    let cancel = CancelToken::new();

    c.bench_function("check_source", |b| {
        b.iter(|| {
            check_source(SOURCE, Path::new("bench.py"), &options, None, &cancel)
                .expect("analysis failed");
        });
    });
}

criterion_group!(benches, bench_check_source);
criterion_main!(benches);
