use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::changes::{Change, Mutation};
use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::*;
use crate::store::WardStore;

/// PostgreSQL-backed [`WardStore`]
///
/// Every write runs inside a transaction. Relative mutations lock the row
/// they compute from with `SELECT ... FOR UPDATE`.
#[derive(Clone)]
pub struct PgStore {
    pool: DatabasePool,
}

impl PgStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn pg(&self) -> &PgPool {
        self.pool.pool()
    }

    async fn fetch_by_id<T>(
        &self,
        sql: &str,
        entity: &'static str,
        id: Uuid,
        map: fn(&PgRow) -> DatabaseResult<T>,
    ) -> DatabaseResult<T> {
        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(self.pg())
            .await?
            .ok_or(DatabaseError::not_found(entity, id))?;
        map(&row)
    }

    async fn fetch_all<T>(&self, sql: &str, map: fn(&PgRow) -> DatabaseResult<T>) -> DatabaseResult<Vec<T>> {
        sqlx::query(sql)
            .fetch_all(self.pg())
            .await?
            .iter()
            .map(map)
            .collect()
    }

    async fn sequence(&self, function: &'static str, prefix: &str) -> DatabaseResult<String> {
        let sql = format!("SELECT {function}($1)");
        sqlx::query_scalar::<_, String>(&sql)
            .bind(prefix)
            .fetch_one(self.pg())
            .await
            .map_err(|e| {
                warn!(function, error = %e, "Sequence generator failed");
                DatabaseError::SequenceUnavailable(function)
            })
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn parse<T: std::str::FromStr<Err = DatabaseError>>(row: &PgRow, column: &str) -> DatabaseResult<T> {
    row.try_get::<String, _>(column)?.parse()
}

fn ward_from_row(row: &PgRow) -> DatabaseResult<Ward> {
    Ok(Ward {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        floor: row.try_get("floor")?,
        total_beds: row.try_get("total_beds")?,
        occupied_beds: row.try_get("occupied_beds")?,
        available_beds: row.try_get("available_beds")?,
        department: row.try_get("department")?,
        nurse_in_charge: row.try_get("nurse_in_charge")?,
        created_at: row.try_get("created_at")?,
    })
}

fn patient_from_row(row: &PgRow) -> DatabaseResult<Patient> {
    Ok(Patient {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
        ward_id: row.try_get("ward_id")?,
        bed_number: row.try_get("bed_number")?,
        admission_date: row.try_get("admission_date")?,
        discharge_date: row.try_get("discharge_date")?,
        diagnosis: row.try_get("diagnosis")?,
        status: parse(row, "status")?,
        doctor: row.try_get("doctor")?,
        emergency_contact: row.try_get("emergency_contact")?,
        blood_group: row.try_get("blood_group")?,
    })
}

fn staff_from_row(row: &PgRow) -> DatabaseResult<StaffMember> {
    Ok(StaffMember {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        role: parse(row, "role")?,
        department: row.try_get("department")?,
        specialization: row.try_get("specialization")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        shift: parse(row, "shift")?,
        status: parse(row, "status")?,
    })
}

fn doctor_from_row(row: &PgRow) -> DatabaseResult<Doctor> {
    Ok(Doctor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        specialization: row.try_get("specialization")?,
        department: row.try_get("department")?,
    })
}

fn transfer_from_row(row: &PgRow) -> DatabaseResult<WardTransfer> {
    Ok(WardTransfer {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        from_ward_id: row.try_get("from_ward_id")?,
        from_bed_number: row.try_get("from_bed_number")?,
        to_ward_id: row.try_get("to_ward_id")?,
        to_bed_number: row.try_get("to_bed_number")?,
        transfer_reason: row.try_get("transfer_reason")?,
        transferred_by: row.try_get("transferred_by")?,
        transferred_by_role: row.try_get("transferred_by_role")?,
        status: parse(row, "status")?,
        transfer_date: row.try_get("transfer_date")?,
        approved_by: row.try_get("approved_by")?,
        approval_date: row.try_get("approval_date")?,
        notes: row.try_get("notes")?,
    })
}

fn bill_from_row(row: &PgRow) -> DatabaseResult<Bill> {
    Ok(Bill {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        bill_number: row.try_get("bill_number")?,
        bill_date: row.try_get("bill_date")?,
        admission_date: row.try_get("admission_date")?,
        discharge_date: row.try_get("discharge_date")?,
        due_date: row.try_get("due_date")?,
        subtotal: row.try_get("subtotal")?,
        tax_percentage: row.try_get("tax_percentage")?,
        tax_amount: row.try_get("tax_amount")?,
        discount_percentage: row.try_get("discount_percentage")?,
        discount_amount: row.try_get("discount_amount")?,
        total_amount: row.try_get("total_amount")?,
        paid_amount: row.try_get("paid_amount")?,
        balance_amount: row.try_get("balance_amount")?,
        status: parse(row, "status")?,
        payment_status: parse(row, "payment_status")?,
        notes: row.try_get("notes")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

fn bill_item_from_row(row: &PgRow) -> DatabaseResult<BillItem> {
    Ok(BillItem {
        id: row.try_get("id")?,
        bill_id: row.try_get("bill_id")?,
        item_type: parse(row, "item_type")?,
        item_name: row.try_get("item_name")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        amount: row.try_get("amount")?,
        created_at: row.try_get("created_at")?,
    })
}

fn payment_from_row(row: &PgRow) -> DatabaseResult<Payment> {
    Ok(Payment {
        id: row.try_get("id")?,
        bill_id: row.try_get("bill_id")?,
        patient_id: row.try_get("patient_id")?,
        payment_number: row.try_get("payment_number")?,
        amount: row.try_get("amount")?,
        payment_method: parse(row, "payment_method")?,
        transaction_id: row.try_get("transaction_id")?,
        reference_number: row.try_get("reference_number")?,
        notes: row.try_get("notes")?,
        received_by: row.try_get("received_by")?,
        payment_date: row.try_get("payment_date")?,
    })
}

fn form_from_row(row: &PgRow, kind: FormKind) -> DatabaseResult<FormRecord> {
    Ok(FormRecord {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        kind,
        form_type: row.try_get("form_type")?,
        form_name: row.try_get("form_name")?,
        template_id: row.try_get("template_id")?,
        filled_by: row.try_get("filled_by")?,
        filled_by_role: row.try_get("filled_by_role")?,
        notes: row.try_get("notes")?,
        form_data: row.try_get("form_data")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn form_table(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Monitoring => "patient_forms",
        FormKind::OperationTheatre => "ot_forms",
    }
}

// ============================================================================
// WRITES
// ============================================================================

fn expect_row(rows_affected: u64, entity: &'static str, id: Uuid) -> DatabaseResult<()> {
    if rows_affected == 0 {
        return Err(DatabaseError::not_found(entity, id));
    }
    Ok(())
}

async fn write_ward(conn: &mut PgConnection, ward: &Ward, insert: bool) -> DatabaseResult<()> {
    let sql = if insert {
        r#"
        INSERT INTO wards (
            id, name, floor, total_beds, occupied_beds, available_beds,
            department, nurse_in_charge, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#
    } else {
        r#"
        UPDATE wards
        SET name = $2, floor = $3, total_beds = $4, occupied_beds = $5,
            available_beds = $6, department = $7, nurse_in_charge = $8, created_at = $9
        WHERE id = $1
        "#
    };
    let result = sqlx::query(sql)
        .bind(ward.id)
        .bind(&ward.name)
        .bind(&ward.floor)
        .bind(ward.total_beds)
        .bind(ward.occupied_beds)
        .bind(ward.available_beds)
        .bind(&ward.department)
        .bind(&ward.nurse_in_charge)
        .bind(ward.created_at)
        .execute(&mut *conn)
        .await?;
    expect_row(result.rows_affected(), "Ward", ward.id)
}

async fn write_patient(conn: &mut PgConnection, patient: &Patient, insert: bool) -> DatabaseResult<()> {
    let sql = if insert {
        r#"
        INSERT INTO patients (
            id, name, age, gender, ward_id, bed_number, admission_date,
            discharge_date, diagnosis, status, doctor, emergency_contact, blood_group
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#
    } else {
        r#"
        UPDATE patients
        SET name = $2, age = $3, gender = $4, ward_id = $5, bed_number = $6,
            admission_date = $7, discharge_date = $8, diagnosis = $9, status = $10,
            doctor = $11, emergency_contact = $12, blood_group = $13
        WHERE id = $1
        "#
    };
    let result = sqlx::query(sql)
        .bind(patient.id)
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.gender)
        .bind(patient.ward_id)
        .bind(&patient.bed_number)
        .bind(patient.admission_date)
        .bind(patient.discharge_date)
        .bind(&patient.diagnosis)
        .bind(patient.status.as_str())
        .bind(&patient.doctor)
        .bind(&patient.emergency_contact)
        .bind(&patient.blood_group)
        .execute(&mut *conn)
        .await?;
    expect_row(result.rows_affected(), "Patient", patient.id)
}

async fn write_staff(conn: &mut PgConnection, member: &StaffMember, insert: bool) -> DatabaseResult<()> {
    let sql = if insert {
        r#"
        INSERT INTO staff (id, name, role, department, specialization, phone, email, shift, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#
    } else {
        r#"
        UPDATE staff
        SET name = $2, role = $3, department = $4, specialization = $5,
            phone = $6, email = $7, shift = $8, status = $9
        WHERE id = $1
        "#
    };
    let result = sqlx::query(sql)
        .bind(member.id)
        .bind(&member.name)
        .bind(member.role.as_str())
        .bind(&member.department)
        .bind(&member.specialization)
        .bind(&member.phone)
        .bind(&member.email)
        .bind(member.shift.as_str())
        .bind(member.status.as_str())
        .execute(&mut *conn)
        .await?;
    expect_row(result.rows_affected(), "Staff member", member.id)
}

async fn write_transfer(conn: &mut PgConnection, transfer: &WardTransfer, insert: bool) -> DatabaseResult<()> {
    let sql = if insert {
        r#"
        INSERT INTO ward_transfers (
            id, patient_id, from_ward_id, from_bed_number, to_ward_id, to_bed_number,
            transfer_reason, transferred_by, transferred_by_role, status,
            transfer_date, approved_by, approval_date, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#
    } else {
        r#"
        UPDATE ward_transfers
        SET patient_id = $2, from_ward_id = $3, from_bed_number = $4, to_ward_id = $5,
            to_bed_number = $6, transfer_reason = $7, transferred_by = $8,
            transferred_by_role = $9, status = $10, transfer_date = $11,
            approved_by = $12, approval_date = $13, notes = $14
        WHERE id = $1
        "#
    };
    let result = sqlx::query(sql)
        .bind(transfer.id)
        .bind(transfer.patient_id)
        .bind(transfer.from_ward_id)
        .bind(&transfer.from_bed_number)
        .bind(transfer.to_ward_id)
        .bind(&transfer.to_bed_number)
        .bind(&transfer.transfer_reason)
        .bind(&transfer.transferred_by)
        .bind(&transfer.transferred_by_role)
        .bind(transfer.status.as_str())
        .bind(transfer.transfer_date)
        .bind(&transfer.approved_by)
        .bind(transfer.approval_date)
        .bind(&transfer.notes)
        .execute(&mut *conn)
        .await?;
    expect_row(result.rows_affected(), "Transfer", transfer.id)
}

async fn write_bill(conn: &mut PgConnection, bill: &Bill, insert: bool) -> DatabaseResult<()> {
    let sql = if insert {
        r#"
        INSERT INTO bills (
            id, patient_id, bill_number, bill_date, admission_date, discharge_date,
            due_date, subtotal, tax_percentage, tax_amount, discount_percentage,
            discount_amount, total_amount, paid_amount, balance_amount, status,
            payment_status, notes, created_by, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        "#
    } else {
        r#"
        UPDATE bills
        SET patient_id = $2, bill_number = $3, bill_date = $4, admission_date = $5,
            discharge_date = $6, due_date = $7, subtotal = $8, tax_percentage = $9,
            tax_amount = $10, discount_percentage = $11, discount_amount = $12,
            total_amount = $13, paid_amount = $14, balance_amount = $15, status = $16,
            payment_status = $17, notes = $18, created_by = $19, created_at = $20
        WHERE id = $1
        "#
    };
    let result = sqlx::query(sql)
        .bind(bill.id)
        .bind(bill.patient_id)
        .bind(&bill.bill_number)
        .bind(bill.bill_date)
        .bind(bill.admission_date)
        .bind(bill.discharge_date)
        .bind(bill.due_date)
        .bind(bill.subtotal)
        .bind(bill.tax_percentage)
        .bind(bill.tax_amount)
        .bind(bill.discount_percentage)
        .bind(bill.discount_amount)
        .bind(bill.total_amount)
        .bind(bill.paid_amount)
        .bind(bill.balance_amount)
        .bind(bill.status.as_str())
        .bind(bill.payment_status.as_str())
        .bind(&bill.notes)
        .bind(&bill.created_by)
        .bind(bill.created_at)
        .execute(&mut *conn)
        .await?;
    expect_row(result.rows_affected(), "Bill", bill.id)
}

async fn delete_row(conn: &mut PgConnection, table: &'static str, entity: &'static str, id: Uuid) -> DatabaseResult<()> {
    let sql = format!("DELETE FROM {table} WHERE id = $1");
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    expect_row(result.rows_affected(), entity, id)
}

async fn apply_on(conn: &mut PgConnection, mutation: &Mutation) -> DatabaseResult<Change> {
    debug!(write = mutation.describe(), "Applying mutation");
    match mutation {
        Mutation::InsertWard(ward) => {
            write_ward(conn, ward, true).await?;
            Ok(Change::Ward(ward.clone()))
        }
        Mutation::UpdateWard(ward) => {
            write_ward(conn, ward, false).await?;
            Ok(Change::Ward(ward.clone()))
        }
        Mutation::DeleteWard(id) => {
            delete_row(conn, "wards", "Ward", *id).await?;
            Ok(Change::WardRemoved(*id))
        }
        Mutation::AdjustBeds { ward_id, direction } => {
            let row = sqlx::query("SELECT * FROM wards WHERE id = $1 FOR UPDATE")
                .bind(ward_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or(DatabaseError::not_found("Ward", *ward_id))?;
            let ward = ward_from_row(&row)?.with_bed_adjustment(*direction);
            sqlx::query("UPDATE wards SET occupied_beds = $2, available_beds = $3 WHERE id = $1")
                .bind(ward.id)
                .bind(ward.occupied_beds)
                .bind(ward.available_beds)
                .execute(&mut *conn)
                .await?;
            Ok(Change::Ward(ward))
        }
        Mutation::InsertPatient(patient) => {
            write_patient(conn, patient, true).await?;
            Ok(Change::Patient(patient.clone()))
        }
        Mutation::UpdatePatient(patient) => {
            write_patient(conn, patient, false).await?;
            Ok(Change::Patient(patient.clone()))
        }
        Mutation::DeletePatient(id) => {
            delete_row(conn, "patients", "Patient", *id).await?;
            Ok(Change::PatientRemoved(*id))
        }
        Mutation::InsertStaff(member) => {
            write_staff(conn, member, true).await?;
            Ok(Change::Staff(member.clone()))
        }
        Mutation::UpdateStaff(member) => {
            write_staff(conn, member, false).await?;
            Ok(Change::Staff(member.clone()))
        }
        Mutation::DeleteStaff(id) => {
            delete_row(conn, "staff", "Staff member", *id).await?;
            Ok(Change::StaffRemoved(*id))
        }
        Mutation::InsertTransfer(transfer) => {
            write_transfer(conn, transfer, true).await?;
            Ok(Change::Transfer(transfer.clone()))
        }
        Mutation::UpdateTransfer(transfer) => {
            write_transfer(conn, transfer, false).await?;
            Ok(Change::Transfer(transfer.clone()))
        }
        Mutation::DeleteTransfer(id) => {
            delete_row(conn, "ward_transfers", "Transfer", *id).await?;
            Ok(Change::TransferRemoved(*id))
        }
        Mutation::InsertBill(bill) => {
            write_bill(conn, bill, true).await?;
            Ok(Change::Bill(bill.clone()))
        }
        Mutation::UpdateBill(bill) => {
            write_bill(conn, bill, false).await?;
            Ok(Change::Bill(bill.clone()))
        }
        Mutation::DeleteBill(id) => {
            delete_row(conn, "bills", "Bill", *id).await?;
            Ok(Change::BillRemoved(*id))
        }
        Mutation::InsertBillItem(item) => {
            sqlx::query(
                r#"
                INSERT INTO bill_items (
                    id, bill_id, item_type, item_name, description,
                    quantity, unit_price, amount, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(item.id)
            .bind(item.bill_id)
            .bind(item.item_type.as_str())
            .bind(&item.item_name)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.amount)
            .bind(item.created_at)
            .execute(&mut *conn)
            .await?;
            Ok(Change::BillItem(item.clone()))
        }
        Mutation::DeleteBillItems { bill_id } => {
            sqlx::query("DELETE FROM bill_items WHERE bill_id = $1")
                .bind(bill_id)
                .execute(&mut *conn)
                .await?;
            Ok(Change::BillItemsRemoved { bill_id: *bill_id })
        }
        Mutation::InsertPayment(payment) => {
            sqlx::query(
                r#"
                INSERT INTO payments (
                    id, bill_id, patient_id, payment_number, amount, payment_method,
                    transaction_id, reference_number, notes, received_by, payment_date
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(payment.id)
            .bind(payment.bill_id)
            .bind(payment.patient_id)
            .bind(&payment.payment_number)
            .bind(payment.amount)
            .bind(payment.payment_method.as_str())
            .bind(&payment.transaction_id)
            .bind(&payment.reference_number)
            .bind(&payment.notes)
            .bind(&payment.received_by)
            .bind(payment.payment_date)
            .execute(&mut *conn)
            .await?;
            Ok(Change::Payment(payment.clone()))
        }
        Mutation::ApplyPayment { bill_id, amount } => {
            let row = sqlx::query("SELECT * FROM bills WHERE id = $1 FOR UPDATE")
                .bind(bill_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or(DatabaseError::not_found("Bill", *bill_id))?;
            let bill = bill_from_row(&row)?.with_payment_applied(*amount);
            sqlx::query(
                "UPDATE bills SET paid_amount = $2, balance_amount = $3, payment_status = $4 WHERE id = $1",
            )
            .bind(bill.id)
            .bind(bill.paid_amount)
            .bind(bill.balance_amount)
            .bind(bill.payment_status.as_str())
            .execute(&mut *conn)
            .await?;
            Ok(Change::Bill(bill))
        }
        Mutation::InsertForm(form) => {
            let sql = format!(
                r#"
                INSERT INTO {} (
                    id, patient_id, form_type, form_name, template_id, filled_by,
                    filled_by_role, notes, form_data, status, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
                form_table(form.kind)
            );
            sqlx::query(&sql)
                .bind(form.id)
                .bind(form.patient_id)
                .bind(&form.form_type)
                .bind(&form.form_name)
                .bind(&form.template_id)
                .bind(&form.filled_by)
                .bind(&form.filled_by_role)
                .bind(&form.notes)
                .bind(&form.form_data)
                .bind(&form.status)
                .bind(form.created_at)
                .execute(&mut *conn)
                .await?;
            Ok(Change::Form(form.clone()))
        }
    }
}

#[async_trait]
impl WardStore for PgStore {
    async fn get_ward(&self, id: Uuid) -> DatabaseResult<Ward> {
        self.fetch_by_id("SELECT * FROM wards WHERE id = $1", "Ward", id, ward_from_row)
            .await
    }

    async fn list_wards(&self) -> DatabaseResult<Vec<Ward>> {
        self.fetch_all("SELECT * FROM wards ORDER BY created_at ASC", ward_from_row)
            .await
    }

    async fn get_patient(&self, id: Uuid) -> DatabaseResult<Patient> {
        self.fetch_by_id("SELECT * FROM patients WHERE id = $1", "Patient", id, patient_from_row)
            .await
    }

    async fn list_patients(&self) -> DatabaseResult<Vec<Patient>> {
        self.fetch_all("SELECT * FROM patients ORDER BY admission_date DESC", patient_from_row)
            .await
    }

    async fn get_staff(&self, id: Uuid) -> DatabaseResult<StaffMember> {
        self.fetch_by_id("SELECT * FROM staff WHERE id = $1", "Staff member", id, staff_from_row)
            .await
    }

    async fn list_staff(&self) -> DatabaseResult<Vec<StaffMember>> {
        self.fetch_all("SELECT * FROM staff ORDER BY name ASC", staff_from_row)
            .await
    }

    async fn list_doctors(&self) -> DatabaseResult<Vec<Doctor>> {
        self.fetch_all("SELECT * FROM doctors ORDER BY name ASC", doctor_from_row)
            .await
    }

    async fn get_transfer(&self, id: Uuid) -> DatabaseResult<WardTransfer> {
        self.fetch_by_id("SELECT * FROM ward_transfers WHERE id = $1", "Transfer", id, transfer_from_row)
            .await
    }

    async fn list_transfers(&self) -> DatabaseResult<Vec<WardTransfer>> {
        self.fetch_all("SELECT * FROM ward_transfers ORDER BY transfer_date DESC", transfer_from_row)
            .await
    }

    async fn get_bill(&self, id: Uuid) -> DatabaseResult<Bill> {
        self.fetch_by_id("SELECT * FROM bills WHERE id = $1", "Bill", id, bill_from_row)
            .await
    }

    async fn list_bills(&self) -> DatabaseResult<Vec<Bill>> {
        self.fetch_all("SELECT * FROM bills ORDER BY bill_date DESC, created_at DESC", bill_from_row)
            .await
    }

    async fn list_bill_items(&self, bill_id: Option<Uuid>) -> DatabaseResult<Vec<BillItem>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM bill_items WHERE 1=1");
        if let Some(id) = bill_id {
            query.push(" AND bill_id = ");
            query.push_bind(id);
        }
        query.push(" ORDER BY bill_id, created_at ASC");

        query
            .build()
            .fetch_all(self.pg())
            .await?
            .iter()
            .map(bill_item_from_row)
            .collect()
    }

    async fn list_payments(&self, bill_id: Option<Uuid>) -> DatabaseResult<Vec<Payment>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM payments WHERE 1=1");
        if let Some(id) = bill_id {
            query.push(" AND bill_id = ");
            query.push_bind(id);
        }
        query.push(" ORDER BY payment_date DESC");

        query
            .build()
            .fetch_all(self.pg())
            .await?
            .iter()
            .map(payment_from_row)
            .collect()
    }

    async fn list_forms(&self, kind: FormKind) -> DatabaseResult<Vec<FormRecord>> {
        let sql = format!("SELECT * FROM {} ORDER BY created_at DESC", form_table(kind));
        sqlx::query(&sql)
            .fetch_all(self.pg())
            .await?
            .iter()
            .map(|row| form_from_row(row, kind))
            .collect()
    }

    async fn next_bill_number(&self, prefix: &str) -> DatabaseResult<String> {
        self.sequence("generate_bill_number", prefix).await
    }

    async fn next_payment_number(&self, prefix: &str) -> DatabaseResult<String> {
        self.sequence("generate_payment_number", prefix).await
    }

    async fn apply(&self, mutation: &Mutation) -> DatabaseResult<Change> {
        let mut tx = self.pg().begin().await?;
        let change = apply_on(&mut tx, mutation).await?;
        tx.commit().await?;
        Ok(change)
    }

    async fn apply_all(&self, mutations: &[Mutation]) -> DatabaseResult<Vec<Change>> {
        let mut tx = self.pg().begin().await?;
        let mut changes = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            // Dropping the transaction on error rolls it back
            changes.push(apply_on(&mut tx, mutation).await?);
        }
        tx.commit().await?;
        Ok(changes)
    }

    async fn is_healthy(&self) -> bool {
        self.pool.is_healthy().await
    }
}
