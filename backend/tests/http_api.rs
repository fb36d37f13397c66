//! HTTP API integration tests over in-memory port doubles.
//!
//! The doubles evaluate predicates with the in-memory matcher, so these
//! tests exercise the full request path (extraction, validation, shaping,
//! envelope status mirroring) without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::Utc;
use url::Url;

use backend::domain::accounts::{verify_password, Account, TestDrive, TestDriveFilter};
use backend::domain::catalog::{Car, CarDraft, CarUpdate, Color, FuelType};
use backend::domain::ports::{
    AccountRepository, CarRepository, GoogleIdentity, GoogleTokenVerifier, Mail, MailError, Mailer,
    NewAccount, NewOrder, OrderRepository, ProfileChanges, ShopRepository, StoreError,
    TestDriveRepository,
};
use backend::domain::sales::{OrderDetails, OrderUpdate, SalesSeries};
use backend::domain::shops::{
    City, Country, GstBreakdown, Shop, ShopDetails, ShopDraft, ShopFilter, State,
};
use backend::domain::{
    AuthConfig, DomainError, Envelope, FileUrlResolver, Predicate, TokenAuthority, TokenKind,
};
use backend::inbound::http::{configure, HttpState};

// ---------------------------------------------------------------------------
// In-memory doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StubCars {
    cars: Mutex<Vec<Car>>,
    next_id: AtomicI32,
}

impl StubCars {
    fn with(cars: Vec<Car>) -> Self {
        let next = cars.iter().map(|car| car.id).max().unwrap_or(0) + 1;
        Self {
            cars: Mutex::new(cars),
            next_id: AtomicI32::new(next),
        }
    }

    fn matching(&self, predicate: &Predicate) -> Vec<Car> {
        self.cars
            .lock()
            .expect("cars lock")
            .iter()
            .filter(|car| {
                serde_json::to_value(car)
                    .map(|value| predicate.matches(&value))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CarRepository for StubCars {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<Car>, StoreError> {
        Ok(self.matching(predicate))
    }

    async fn find(&self, id: i32) -> Result<Option<Car>, StoreError> {
        Ok(self
            .cars
            .lock()
            .expect("cars lock")
            .iter()
            .find(|car| car.id == id)
            .cloned())
    }

    async fn insert(&self, draft: CarDraft, images: [String; 4]) -> Result<Car, StoreError> {
        let [one, two, three, four] = images;
        let car = Car {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: draft.name,
            version: draft.version,
            price: draft.price,
            fuel_type: draft.fuel_type,
            mileage: draft.mileage,
            engine: draft.engine,
            transmission: draft.transmission,
            seat: draft.seat,
            color: draft.color,
            rating: draft.rating,
            power: draft.power,
            new_arrival: draft.new_arrival,
            image_one: Some(one),
            image_two: Some(two),
            image_three: Some(three),
            image_four: Some(four),
        };
        self.cars.lock().expect("cars lock").push(car.clone());
        Ok(car)
    }

    async fn update(
        &self,
        predicate: &Predicate,
        update: CarUpdate,
    ) -> Result<Vec<Car>, StoreError> {
        let mut cars = self.cars.lock().expect("cars lock");
        let mut touched = Vec::new();
        for car in cars.iter_mut() {
            let matches = serde_json::to_value(&*car)
                .map(|value| predicate.matches(&value))
                .unwrap_or(false);
            if !matches {
                continue;
            }
            if let Some(price) = update.price {
                car.price = price;
            }
            if let Some(rating) = update.rating {
                car.rating = rating;
            }
            if let Some(name) = update.name.clone() {
                car.name = name;
            }
            touched.push(car.clone());
        }
        Ok(touched)
    }

    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let mut cars = self.cars.lock().expect("cars lock");
        let before = cars.len();
        cars.retain(|car| {
            serde_json::to_value(car)
                .map(|value| !predicate.matches(&value))
                .unwrap_or(true)
        });
        Ok((before - cars.len()) as u64)
    }
}

#[derive(Default)]
struct StubOrders;

#[async_trait]
impl OrderRepository for StubOrders {
    async fn list(&self, _predicate: &Predicate) -> Result<Vec<OrderDetails>, StoreError> {
        Ok(Vec::new())
    }

    async fn insert(&self, order: NewOrder) -> Result<OrderDetails, StoreError> {
        Ok(OrderDetails {
            id: 1,
            car: None,
            customer: None,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            order_date: order.order_date,
        })
    }

    async fn update(
        &self,
        _predicate: &Predicate,
        _update: OrderUpdate,
    ) -> Result<(u64, Vec<OrderDetails>), StoreError> {
        Ok((0, Vec::new()))
    }

    async fn delete(&self, _predicate: &Predicate) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn monthly_sales(&self) -> Result<Vec<SalesSeries>, StoreError> {
        Ok(Vec::new())
    }
}

struct StubShops {
    countries: Vec<Country>,
    states: Vec<State>,
    cities: Vec<City>,
    shops: Mutex<Vec<Shop>>,
    next_id: AtomicI32,
}

impl StubShops {
    fn seeded() -> Self {
        Self {
            countries: vec![Country {
                id: 1,
                name: "India".to_owned(),
                gst_rate: 10.0,
            }],
            states: vec![State {
                id: 1,
                name: "Goa".to_owned(),
                country_id: 1,
                gst_rate: 8.5,
            }],
            cities: vec![City {
                id: 1,
                name: "Panaji".to_owned(),
                state_id: 1,
            }],
            shops: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
        }
    }

    fn details(&self, shop: &Shop) -> Result<ShopDetails, StoreError> {
        let country = self
            .countries
            .iter()
            .find(|country| country.id == shop.country_id)
            .ok_or_else(|| StoreError::query("shop references a missing country"))?;
        let state = self
            .states
            .iter()
            .find(|state| state.id == shop.state_id)
            .ok_or_else(|| StoreError::query("shop references a missing state"))?;
        let city = self
            .cities
            .iter()
            .find(|city| city.id == shop.city_id)
            .ok_or_else(|| StoreError::query("shop references a missing city"))?;
        Ok(ShopDetails {
            id: shop.id,
            name: shop.name.clone(),
            country: country.clone(),
            state: state.clone(),
            city: city.clone(),
            marker_offset: shop.marker_offset,
            coordinates: shop.coordinates.clone(),
        })
    }

    fn snapshot(&self) -> Vec<Shop> {
        self.shops.lock().expect("shops lock").clone()
    }
}

#[async_trait]
impl ShopRepository for StubShops {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<ShopDetails>, StoreError> {
        self.shops
            .lock()
            .expect("shops lock")
            .iter()
            .filter(|shop| {
                serde_json::to_value(shop)
                    .map(|value| predicate.matches(&value))
                    .unwrap_or(false)
            })
            .map(|shop| self.details(shop))
            .collect()
    }

    async fn find_country(&self, id: i32) -> Result<Option<Country>, StoreError> {
        Ok(self
            .countries
            .iter()
            .find(|country| country.id == id)
            .cloned())
    }

    async fn find_state(&self, id: i32) -> Result<Option<State>, StoreError> {
        Ok(self.states.iter().find(|state| state.id == id).cloned())
    }

    async fn find_city(&self, id: i32) -> Result<Option<City>, StoreError> {
        Ok(self.cities.iter().find(|city| city.id == id).cloned())
    }

    async fn insert(&self, draft: ShopDraft) -> Result<ShopDetails, StoreError> {
        let shop = Shop {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: draft.name,
            country_id: draft.country,
            state_id: draft.state,
            city_id: draft.city,
            marker_offset: draft.marker_offset,
            coordinates: draft.coordinates,
        };
        let details = self.details(&shop)?;
        self.shops.lock().expect("shops lock").push(shop);
        Ok(details)
    }

    async fn update(
        &self,
        predicate: &Predicate,
        patch: ShopFilter,
    ) -> Result<(u64, Vec<ShopDetails>), StoreError> {
        let mut shops = self.shops.lock().expect("shops lock");
        let mut touched = Vec::new();
        for shop in shops.iter_mut() {
            let matches = serde_json::to_value(&*shop)
                .map(|value| predicate.matches(&value))
                .unwrap_or(false);
            if !matches {
                continue;
            }
            if let Some(name) = patch.name.clone() {
                shop.name = name;
            }
            if let Some(country) = patch.country {
                shop.country_id = country;
            }
            if let Some(state) = patch.state {
                shop.state_id = state;
            }
            if let Some(city) = patch.city {
                shop.city_id = city;
            }
            if let Some(offset) = patch.marker_offset {
                shop.marker_offset = offset;
            }
            if let Some(coordinates) = patch.coordinates.clone() {
                shop.coordinates = coordinates;
            }
            touched.push(self.details(shop)?);
        }
        Ok((touched.len() as u64, touched))
    }

    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let mut shops = self.shops.lock().expect("shops lock");
        let before = shops.len();
        shops.retain(|shop| {
            serde_json::to_value(shop)
                .map(|value| !predicate.matches(&value))
                .unwrap_or(true)
        });
        Ok((before - shops.len()) as u64)
    }

    async fn gst_breakdown(&self) -> Result<Vec<GstBreakdown>, StoreError> {
        self.states
            .iter()
            .map(|state| {
                self.countries
                    .iter()
                    .find(|country| country.id == state.country_id)
                    .map(|country| GstBreakdown::new(state, country))
                    .ok_or_else(|| StoreError::query("state references a missing country"))
            })
            .collect()
    }
}

#[derive(Default)]
struct StubAccounts {
    accounts: Mutex<Vec<Account>>,
    avatars: Mutex<HashMap<i32, String>>,
    next_id: AtomicI32,
}

impl StubAccounts {
    fn with(accounts: Vec<Account>) -> Self {
        let next = accounts.iter().map(|account| account.id).max().unwrap_or(0) + 1;
        Self {
            accounts: Mutex::new(accounts),
            avatars: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(next),
        }
    }

    fn snapshot(&self) -> Vec<Account> {
        self.accounts.lock().expect("accounts lock").clone()
    }
}

#[async_trait]
impl AccountRepository for StubAccounts {
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .expect("accounts lock")
            .iter()
            .find(|account| account.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .expect("accounts lock")
            .iter()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .expect("accounts lock")
            .iter()
            .find(|account| account.username == username || account.email == email)
            .cloned())
    }

    async fn find_by_username_and_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .expect("accounts lock")
            .iter()
            .find(|account| account.username == username && account.email == email)
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let stored = Account {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            active: account.active,
        };
        self.accounts
            .lock()
            .expect("accounts lock")
            .push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .expect("accounts lock")
            .retain(|account| account.id != id);
        Ok(())
    }

    async fn activate(&self, id: i32) -> Result<(), StoreError> {
        for account in self.accounts.lock().expect("accounts lock").iter_mut() {
            if account.id == id {
                account.active = true;
            }
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: i32, hash: &str) -> Result<(), StoreError> {
        for account in self.accounts.lock().expect("accounts lock").iter_mut() {
            if account.id == id {
                account.password_hash = hash.to_owned();
            }
        }
        Ok(())
    }

    async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<(), StoreError> {
        for account in self.accounts.lock().expect("accounts lock").iter_mut() {
            if account.id != id {
                continue;
            }
            if let Some(username) = changes.username.clone() {
                account.username = username;
            }
            if let Some(email) = changes.email.clone() {
                account.email = email;
            }
            if let Some(hash) = changes.password_hash.clone() {
                account.password_hash = hash;
            }
        }
        Ok(())
    }

    async fn avatar(&self, id: i32) -> Result<Option<String>, StoreError> {
        Ok(self.avatars.lock().expect("avatar lock").get(&id).cloned())
    }

    async fn set_avatar(&self, id: i32, avatar: &str) -> Result<(), StoreError> {
        self.avatars
            .lock()
            .expect("avatar lock")
            .insert(id, avatar.to_owned());
        Ok(())
    }
}

#[derive(Default)]
struct StubTestDrives {
    drives: Mutex<Vec<TestDrive>>,
}

#[async_trait]
impl TestDriveRepository for StubTestDrives {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<TestDrive>, StoreError> {
        Ok(self
            .drives
            .lock()
            .expect("drives lock")
            .iter()
            .filter(|drive| {
                serde_json::to_value(drive)
                    .map(|value| predicate.matches(&value))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, username: &str, email: &str) -> Result<TestDrive, StoreError> {
        let mut drives = self.drives.lock().expect("drives lock");
        let drive = TestDrive {
            id: i32::try_from(drives.len()).unwrap_or(0) + 1,
            username: username.to_owned(),
            email: email.to_owned(),
        };
        drives.push(drive.clone());
        Ok(drive)
    }

    async fn update(
        &self,
        predicate: &Predicate,
        patch: TestDriveFilter,
    ) -> Result<(u64, Vec<TestDrive>), StoreError> {
        let mut drives = self.drives.lock().expect("drives lock");
        let mut touched = Vec::new();
        for drive in drives.iter_mut() {
            let matches = serde_json::to_value(&*drive)
                .map(|value| predicate.matches(&value))
                .unwrap_or(false);
            if !matches {
                continue;
            }
            if let Some(username) = patch.username.clone() {
                drive.username = username;
            }
            if let Some(email) = patch.email.clone() {
                drive.email = email;
            }
            touched.push(drive.clone());
        }
        Ok((touched.len() as u64, touched))
    }

    async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let mut drives = self.drives.lock().expect("drives lock");
        let before = drives.len();
        drives.retain(|drive| {
            serde_json::to_value(drive)
                .map(|value| !predicate.matches(&value))
                .unwrap_or(true)
        });
        Ok((before - drives.len()) as u64)
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<Mail>>,
    fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: Mail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::dispatch("relay refused"));
        }
        self.sent.lock().expect("mail lock").push(mail);
        Ok(())
    }
}

struct StubGoogle {
    identity: Option<GoogleIdentity>,
}

#[async_trait]
impl GoogleTokenVerifier for StubGoogle {
    async fn verify(&self, _id_token: &str) -> Result<GoogleIdentity, DomainError> {
        self.identity
            .clone()
            .ok_or_else(|| DomainError::unauthorized("invalid google token"))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn sample_car(id: i32, name: &str) -> Car {
    Car {
        id,
        name: name.to_owned(),
        version: 2.0,
        price: 1_500_000.0,
        fuel_type: FuelType::Petrol,
        mileage: 18,
        engine: "1.5 TSI".to_owned(),
        transmission: "manual".to_owned(),
        seat: 5,
        color: Color::Red,
        rating: 4,
        power: 110.0,
        new_arrival: false,
        image_one: Some("car_image/front.jpg".to_owned()),
        image_two: Some("car_image/back.jpg".to_owned()),
        image_three: Some("car_image/side.jpg".to_owned()),
        image_four: Some("car_image/inside.jpg".to_owned()),
    }
}

fn sample_shop(id: i32, name: &str) -> Shop {
    Shop {
        id,
        name: name.to_owned(),
        country_id: 1,
        state_id: 1,
        city_id: 1,
        marker_offset: 0.5,
        coordinates: "15.49,73.82".to_owned(),
    }
}

fn verified_account(id: i32, username: &str, email: &str, password: &str) -> Account {
    Account {
        id,
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash: backend::domain::accounts::hash_password(password).expect("hash"),
        active: true,
    }
}

struct Fixture {
    cars: Arc<StubCars>,
    shops: Arc<StubShops>,
    accounts: Arc<StubAccounts>,
    mailer: Arc<RecordingMailer>,
    test_drives: Arc<StubTestDrives>,
    tokens: TokenAuthority,
    state: HttpState,
}

fn fixture(cars: Vec<Car>, accounts: Vec<Account>, mail_fails: bool) -> Fixture {
    let cars = Arc::new(StubCars::with(cars));
    let shops = Arc::new(StubShops::seeded());
    let accounts = Arc::new(StubAccounts::with(accounts));
    let mailer = Arc::new(RecordingMailer {
        sent: Mutex::new(Vec::new()),
        fail: mail_fails,
    });
    let test_drives = Arc::new(StubTestDrives::default());
    let tokens = TokenAuthority::new(&AuthConfig::new("integration-secret", 300, 86_400));
    let state = HttpState {
        cars: cars.clone(),
        orders: Arc::new(StubOrders),
        shops: shops.clone(),
        accounts: accounts.clone(),
        test_drives: test_drives.clone(),
        mailer: mailer.clone(),
        google: Arc::new(StubGoogle {
            identity: Some(GoogleIdentity {
                name: "Traveller".to_owned(),
                email: "traveller@example.com".to_owned(),
            }),
        }),
        tokens: tokens.clone(),
        files: FileUrlResolver::new(Url::parse("http://localhost:8080/media/").expect("base")),
        public_base: Url::parse("http://localhost:8080/").expect("base"),
    };
    Fixture {
        cars,
        shops,
        accounts,
        mailer,
        test_drives,
        tokens,
        state,
    }
}

fn access_token(fixture: &Fixture) -> String {
    fixture
        .tokens
        .issue("admin", "admin@example.com", TokenKind::Access)
        .expect("token")
}

macro_rules! init_app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($fixture.state.clone()))
                .configure(configure),
        )
        .await
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn listing_without_a_token_is_unauthorized() {
    let fx = fixture(vec![sample_car(1, "City")], Vec::new(), false);
    let app = init_app!(fx);

    let req = test::TestRequest::get().uri("/api/v1/cars").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.status_code, 401);
    assert!(envelope.error.contains_key("token"));
}

#[actix_rt::test]
async fn listing_resolves_image_references_to_absolute_urls() {
    let fx = fixture(vec![sample_car(1, "City")], Vec::new(), false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/cars")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.status_code, 200);
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(
        envelope.data[0]["image_one"],
        "http://localhost:8080/media/car_image/front.jpg"
    );
}

#[actix_rt::test]
async fn search_matches_text_fields_case_insensitively() {
    let fx = fixture(
        vec![sample_car(1, "Honda City"), sample_car(2, "Fronx")],
        Vec::new(),
        false,
    );
    let token = access_token(&fx);
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/cars/search?search=city")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0]["name"], "Honda City");
}

#[actix_rt::test]
async fn search_with_numeric_term_matches_numeric_fields() {
    let mut five_seater = sample_car(1, "City");
    five_seater.seat = 5;
    let mut seven_seater = sample_car(2, "Ertiga");
    seven_seater.seat = 7;
    seven_seater.rating = 3;
    let fx = fixture(vec![five_seater, seven_seater], Vec::new(), false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/cars/search?search=7")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0]["name"], "Ertiga");
}

#[actix_rt::test]
async fn adding_a_car_requires_exactly_four_images() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "name": "Slavia", "version": 1.5, "price": 1_200_000.0,
        "fuel_type": "petrol", "mileage": 18, "engine": "1.0 TSI",
        "transmission": "manual", "seat": 5, "color": "white",
        "rating": 4, "power": 85.0,
        "images": ["a.jpg", "b.jpg", "c.jpg"]
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/cars")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert!(envelope.error.contains_key("product_image"));
}

#[actix_rt::test]
async fn adding_a_car_rejects_unsupported_image_types() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "name": "Slavia", "version": 1.5, "price": 1_200_000.0,
        "fuel_type": "petrol", "mileage": 18, "engine": "1.0 TSI",
        "transmission": "manual", "seat": 5, "color": "white",
        "rating": 4, "power": 85.0,
        "images": ["a.jpg", "b.jpg", "c.jpg", "d.gif"]
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/cars")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
async fn price_calculation_returns_the_gst_breakdown() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/cars/price-calculation")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0]["state"], "Goa");
    // State rate 8.5 plus country rate 10.0.
    assert_eq!(envelope.data[0]["gst_rate"], 18.5);
}

#[actix_rt::test]
async fn sign_up_sends_a_verification_mail() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "username": "rider",
        "email": "rider@example.com",
        "password": "wheels-up"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/sign-up")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);

    let sent = fx.mailer.sent.lock().expect("mail lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "rider@example.com");
    assert!(sent[0].body.contains("/api/v1/accounts/verify/"));

    let accounts = fx.accounts.snapshot();
    assert_eq!(accounts.len(), 1);
    assert!(!accounts[0].active);
}

#[actix_rt::test]
async fn sign_up_compensates_when_the_mail_fails() {
    let fx = fixture(Vec::new(), Vec::new(), true);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "username": "rider",
        "email": "rider@example.com",
        "password": "wheels-up"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/sign-up")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 502);

    assert!(fx.accounts.snapshot().is_empty());
}

#[actix_rt::test]
async fn sign_up_rejects_duplicate_accounts() {
    let existing = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![existing], false);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "username": "rider",
        "email": "other@example.com",
        "password": "wheels-up"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/sign-up")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
async fn verification_activates_the_account() {
    let mut account = verified_account(1, "rider", "rider@example.com", "pw");
    account.active = false;
    let fx = fixture(Vec::new(), vec![account], false);
    let token = fx
        .tokens
        .issue("rider", "rider@example.com", TokenKind::Access)
        .expect("token");
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/accounts/verify/{token}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert!(fx.accounts.snapshot()[0].active);
}

#[actix_rt::test]
async fn verification_refuses_refresh_tokens() {
    let mut account = verified_account(1, "rider", "rider@example.com", "pw");
    account.active = false;
    let fx = fixture(Vec::new(), vec![account], false);
    let refresh = fx
        .tokens
        .issue("rider", "rider@example.com", TokenKind::Refresh)
        .expect("token");
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/accounts/verify/{refresh}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
    assert!(!fx.accounts.snapshot()[0].active);
}

#[actix_rt::test]
async fn login_rejects_a_wrong_password() {
    let account = verified_account(1, "rider", "rider@example.com", "right-password");
    let fx = fixture(Vec::new(), vec![account], false);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "email": "rider@example.com",
        "password": "wrong-password"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/login")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_rt::test]
async fn login_rejects_unverified_accounts() {
    let mut account = verified_account(1, "rider", "rider@example.com", "pw");
    account.active = false;
    let fx = fixture(Vec::new(), vec![account], false);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "email": "rider@example.com",
        "password": "pw"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/login")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_rt::test]
async fn login_returns_a_token_pair() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "email": "rider@example.com",
        "password": "pw"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/login")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.data.len(), 1);
    assert!(envelope.data[0]["access_token"].is_string());
    assert!(envelope.data[0]["refresh_token"].is_string());
}

#[actix_rt::test]
async fn refresh_refuses_an_access_token() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    let access = fx
        .tokens
        .issue("rider", "rider@example.com", TokenKind::Access)
        .expect("token");
    let app = init_app!(fx);

    let body = serde_json::json!({ "refresh_token": access });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/refresh")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_rt::test]
async fn refresh_exchanges_a_refresh_token() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    let refresh = fx
        .tokens
        .issue("rider", "rider@example.com", TokenKind::Refresh)
        .expect("token");
    let app = init_app!(fx);

    let body = serde_json::json!({ "refresh_token": refresh });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/refresh")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_rt::test]
async fn protected_routes_refuse_refresh_tokens() {
    let fx = fixture(vec![sample_car(1, "City")], Vec::new(), false);
    let refresh = fx
        .tokens
        .issue("admin", "admin@example.com", TokenKind::Refresh)
        .expect("token");
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/cars")
        .insert_header(("Authorization", format!("Bearer {refresh}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_rt::test]
async fn google_sign_in_provisions_a_verified_account() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    let app = init_app!(fx);

    let body = serde_json::json!({ "id_token": "opaque" });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/google")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let accounts = fx.accounts.snapshot();
    assert_eq!(accounts.len(), 1);
    assert!(accounts[0].active);
    assert_eq!(accounts[0].email, "traveller@example.com");
}

#[actix_rt::test]
async fn recording_a_sale_requires_an_existing_car() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "car": 99,
        "customer": 1,
        "payment_method": "cash",
        "payment_status": "pending"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/sales")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert!(envelope.error.contains_key("car"));
}

#[actix_rt::test]
async fn test_drive_requires_a_matching_account() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "username": "rider",
        "email": "someone-else@example.com"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/test-drives")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    assert!(fx.test_drives.drives.lock().expect("drives lock").is_empty());
}

#[actix_rt::test]
async fn test_drive_is_recorded_for_a_matching_account() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "username": "rider",
        "email": "rider@example.com"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/test-drives")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    assert_eq!(fx.test_drives.drives.lock().expect("drives lock").len(), 1);
}

#[actix_rt::test]
async fn bulk_update_returns_the_reloaded_cars() {
    let fx = fixture(
        vec![sample_car(1, "City"), sample_car(2, "Fronx")],
        Vec::new(),
        false,
    );
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({ "price": 999_000.0 });
    let req = test::TestRequest::post()
        .uri("/api/v1/cars/update?id=2")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0]["price"], 999_000.0);

    let untouched = fx.cars.matching(&Predicate::All);
    assert!(untouched
        .iter()
        .any(|car| car.id == 1 && (car.price - 1_500_000.0).abs() < f64::EPSILON));
}

#[actix_rt::test]
async fn bulk_delete_reports_the_count() {
    let fx = fixture(
        vec![sample_car(1, "City"), sample_car(2, "Fronx")],
        Vec::new(),
        false,
    );
    let token = access_token(&fx);
    let app = init_app!(fx);

    let req = test::TestRequest::delete()
        .uri("/api/v1/cars?color=red")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.description.as_deref(), Some("2 cars deleted"));
    assert!(fx.cars.matching(&Predicate::All).is_empty());
}

// Keep chrono linked into the fixture even though no test names it directly.
#[actix_rt::test]
async fn order_date_defaults_reach_the_repository() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let mut car = sample_car(1, "City");
    car.id = 1;
    let before = Utc::now();
    let fx = fixture(vec![car], vec![account], false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "car": 1,
        "customer": 1,
        "payment_method": "upi",
        "payment_status": "complete"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/sales")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);

    let envelope: Envelope = test::read_body_json(resp).await;
    let recorded = envelope.data[0]["order_date"]
        .as_str()
        .expect("order date")
        .parse::<chrono::DateTime<Utc>>()
        .expect("timestamp");
    assert!(recorded >= before);
}

#[actix_rt::test]
async fn adding_a_shop_joins_its_location_hierarchy() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "name": "Beach Motors",
        "country": 1, "state": 1, "city": 1,
        "marker_offset": 0.5,
        "coordinates": "15.49,73.82"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/shops")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0]["country"]["name"], "India");
    assert_eq!(envelope.data[0]["state"]["name"], "Goa");
    assert_eq!(envelope.data[0]["city"]["name"], "Panaji");
    assert_eq!(fx.shops.snapshot().len(), 1);
}

#[actix_rt::test]
async fn adding_a_shop_rejects_an_unknown_country() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "name": "Nowhere Motors",
        "country": 99, "state": 1, "city": 1,
        "marker_offset": 0.5,
        "coordinates": "0,0"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/shops")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.status_code, 404);
    assert!(envelope.error.contains_key("country"));
    assert!(fx.shops.snapshot().is_empty());
}

#[actix_rt::test]
async fn shop_update_rejects_an_unknown_state() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    fx.shops
        .shops
        .lock()
        .expect("shops lock")
        .push(sample_shop(1, "Beach Motors"));
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({ "state": 42 });
    let req = test::TestRequest::patch()
        .uri("/api/v1/shops?id=1")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert!(envelope.error.contains_key("state"));
    assert_eq!(fx.shops.snapshot()[0].state_id, 1);
}

#[actix_rt::test]
async fn shop_update_applies_the_patch_to_matches() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    {
        let mut shops = fx.shops.shops.lock().expect("shops lock");
        shops.push(sample_shop(1, "Beach Motors"));
        shops.push(sample_shop(2, "Hill Motors"));
    }
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({ "name": "Renamed Motors" });
    let req = test::TestRequest::patch()
        .uri("/api/v1/shops?id=1")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.description.as_deref(), Some("1 shops updated"));
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0]["name"], "Renamed Motors");
    assert_eq!(fx.shops.snapshot()[1].name, "Hill Motors");
}

#[actix_rt::test]
async fn profile_returns_the_avatar_as_an_absolute_url() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    fx.accounts
        .avatars
        .lock()
        .expect("avatar lock")
        .insert(1, "avatar/rider.png".to_owned());
    let token = fx
        .tokens
        .issue("rider", "rider@example.com", TokenKind::Access)
        .expect("token");
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/accounts/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.data[0]["username"], "rider");
    assert_eq!(
        envelope.data[0]["avatar"],
        "http://localhost:8080/media/avatar/rider.png"
    );
}

#[actix_rt::test]
async fn profile_update_ignores_blank_fields_and_upserts_the_avatar() {
    let account = verified_account(1, "rider", "rider@example.com", "old-password");
    let fx = fixture(Vec::new(), vec![account], false);
    let token = fx
        .tokens
        .issue("rider", "rider@example.com", TokenKind::Access)
        .expect("token");
    let app = init_app!(fx);

    let body = serde_json::json!({
        "username": "",
        "password": "fresh-password",
        "avatar": "avatar/new.png"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(
        envelope.description.as_deref(),
        Some("profile updated successfully")
    );
    assert_eq!(envelope.data[0]["username"], "rider");
    assert_eq!(
        envelope.data[0]["avatar"],
        "http://localhost:8080/media/avatar/new.png"
    );

    let stored = fx.accounts.snapshot().remove(0);
    assert_eq!(stored.username, "rider");
    assert!(verify_password("fresh-password", &stored.password_hash));
    assert!(!verify_password("old-password", &stored.password_hash));
}

#[actix_rt::test]
async fn profile_update_rejects_unsupported_avatar_types() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    let token = fx
        .tokens
        .issue("rider", "rider@example.com", TokenKind::Access)
        .expect("token");
    let app = init_app!(fx);

    let body = serde_json::json!({ "avatar": "avatar/me.gif" });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    assert!(fx.accounts.avatars.lock().expect("avatar lock").is_empty());
}

#[actix_rt::test]
async fn change_password_requires_matching_confirmation() {
    let account = verified_account(1, "rider", "rider@example.com", "pw");
    let fx = fixture(Vec::new(), vec![account], false);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "email": "rider@example.com",
        "password": "one-thing",
        "confirm_password": "another-thing"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/change-password")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert!(envelope.error.contains_key("password"));
}

#[actix_rt::test]
async fn change_password_replaces_the_stored_hash() {
    let account = verified_account(1, "rider", "rider@example.com", "old-password");
    let fx = fixture(Vec::new(), vec![account], false);
    let app = init_app!(fx);

    let body = serde_json::json!({
        "email": "rider@example.com",
        "password": "new-password",
        "confirm_password": "new-password"
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/accounts/change-password")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let stored = fx.accounts.snapshot().remove(0);
    assert!(verify_password("new-password", &stored.password_hash));
}

#[actix_rt::test]
async fn test_drive_listing_filters_by_username() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    {
        let mut drives = fx.test_drives.drives.lock().expect("drives lock");
        drives.push(TestDrive {
            id: 1,
            username: "rider".to_owned(),
            email: "rider@example.com".to_owned(),
        });
        drives.push(TestDrive {
            id: 2,
            username: "walker".to_owned(),
            email: "walker@example.com".to_owned(),
        });
    }
    let token = access_token(&fx);
    let app = init_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/test-drives?username=rider")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0]["username"], "rider");
}

#[actix_rt::test]
async fn test_drive_bulk_update_reports_the_count() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    {
        let mut drives = fx.test_drives.drives.lock().expect("drives lock");
        drives.push(TestDrive {
            id: 1,
            username: "rider".to_owned(),
            email: "rider@example.com".to_owned(),
        });
        drives.push(TestDrive {
            id: 2,
            username: "walker".to_owned(),
            email: "walker@example.com".to_owned(),
        });
    }
    let token = access_token(&fx);
    let app = init_app!(fx);

    let body = serde_json::json!({ "username": "sprinter" });
    let req = test::TestRequest::patch()
        .uri("/api/v1/test-drives?email=rider@example.com")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(
        envelope.description.as_deref(),
        Some("1 test drives updated")
    );
    assert_eq!(envelope.data.len(), 1);
    assert_eq!(envelope.data[0]["username"], "sprinter");

    let drives = fx.test_drives.drives.lock().expect("drives lock");
    assert_eq!(drives[1].username, "walker");
}

#[actix_rt::test]
async fn test_drive_bulk_delete_removes_matches() {
    let fx = fixture(Vec::new(), Vec::new(), false);
    {
        let mut drives = fx.test_drives.drives.lock().expect("drives lock");
        drives.push(TestDrive {
            id: 1,
            username: "rider".to_owned(),
            email: "rider@example.com".to_owned(),
        });
        drives.push(TestDrive {
            id: 2,
            username: "walker".to_owned(),
            email: "walker@example.com".to_owned(),
        });
    }
    let token = access_token(&fx);
    let app = init_app!(fx);

    let req = test::TestRequest::delete()
        .uri("/api/v1/test-drives?username=rider")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let envelope: Envelope = test::read_body_json(resp).await;
    assert_eq!(envelope.description.as_deref(), Some("1 test drives deleted"));

    let drives = fx.test_drives.drives.lock().expect("drives lock");
    assert_eq!(drives.len(), 1);
    assert_eq!(drives[0].username, "walker");
}
