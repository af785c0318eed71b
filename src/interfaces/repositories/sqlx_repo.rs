use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxPropertyRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxPropertyImageRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxBookingRepo {
    pub pool: PgPool,
}
